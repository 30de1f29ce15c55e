//! HTTP 中间件与共享状态
//! 请求追踪、JSON 请求体提取

use axum::{
    extract::{FromRequest, Request},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    auth::{jwt::JwtService, password::PasswordHasher},
    config::AppConfig,
    error::AppError,
    repository::UserRepository,
    services::{AuthService, ProfileService},
};

/// 应用状态
///
/// 所有协作者在启动时注入，请求之间只读共享。
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub repository: Arc<dyn UserRepository>,
    pub jwt_service: Arc<JwtService>,
    pub auth_service: Arc<AuthService>,
    pub profile_service: Arc<ProfileService>,
}

impl AppState {
    /// 按配置组装服务，存储后端由调用方提供
    pub fn from_config(
        config: AppConfig,
        repository: Arc<dyn UserRepository>,
    ) -> Result<Self, AppError> {
        let jwt_service = Arc::new(JwtService::from_config(&config.security)?);
        let hasher = Arc::new(PasswordHasher::from_config(&config.security)?);

        let auth_service = Arc::new(AuthService::new(
            repository.clone(),
            jwt_service.clone(),
            hasher.clone(),
        ));
        let profile_service = Arc::new(ProfileService::new(
            repository.clone(),
            hasher,
            config.security.clone(),
        ));

        Ok(Self {
            config,
            repository,
            jwt_service,
            auth_service,
            profile_service,
        })
    }
}

/// JSON 请求体提取器，解析失败统一返回 INVALID_REQUEST 信封
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    async move {
        let start = Instant::now();

        let mut response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        // 状态码按类别聚合，避免标签基数膨胀
        metrics::counter!(
            "http_requests_total",
            "method" => method.to_string(),
            "status" => format!("{}xx", status / 100)
        )
        .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty() && s.len() <= 128)
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
