//! 认证相关的 HTTP 处理器

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    middleware::{AppJson, AppState},
    models::{auth::*, envelope::ApiResponse},
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

/// 注册
pub async fn register(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let payload = state.auth_service.register(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("User registered successfully", payload)),
    ))
}

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let payload = state.auth_service.login(req).await?;

    Ok(Json(ApiResponse::with_message("Login successful", payload)))
}

/// 获取当前用户信息
pub async fn me(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let user = state.auth_service.current_user(auth_context.user_id).await?;

    Ok(Json(ApiResponse::data(json!({ "user": user }))))
}

/// 登出
///
/// 令牌无状态，服务端无需撤销，由客户端丢弃。
pub async fn logout(auth_context: AuthContext) -> impl IntoResponse {
    tracing::info!(user_id = %auth_context.user_id, "User logged out");

    Json(ApiResponse::<()>::message("Logout successful"))
}
