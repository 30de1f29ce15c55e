//! 健康检查处理器
//! 提供 /health 与 /ready 端点

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::{middleware::AppState, models::envelope::ApiResponse};

/// 存活探针响应
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_secs: u64,
}

/// 就绪探针响应
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: Vec<HealthCheck>,
}

/// 健康检查项
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

static APP_START_TIME: OnceCell<Instant> = OnceCell::new();

/// 记录应用启动时间（main 中调用一次）
pub fn set_start_time() {
    let _ = APP_START_TIME.set(Instant::now());
}

/// 获取应用运行时间（秒）
pub fn get_uptime() -> u64 {
    APP_START_TIME
        .get()
        .map_or(0, |start| start.elapsed().as_secs())
}

/// 存活探针
/// 快速响应，不检查依赖
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::with_message(
        "Space Explorer API is running",
        HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: state.config.server.environment.clone(),
            timestamp: Utc::now(),
            uptime_secs: get_uptime(),
        },
    ))
}

/// 就绪探针
/// 检查用户存储是否可用
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let check = match state.repository.ping().await {
        Ok(()) => HealthCheck {
            name: "database".to_string(),
            status: "healthy".to_string(),
            message: None,
        },
        Err(e) => HealthCheck {
            name: "database".to_string(),
            status: "unhealthy".to_string(),
            message: Some(e.to_string()),
        },
    };

    let checks = vec![check];
    let ready = checks.iter().all(|c| c.status == "healthy");
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let mut body = ApiResponse::data(ReadinessResponse { ready, checks });
    body.success = ready;

    (status, Json(body))
}
