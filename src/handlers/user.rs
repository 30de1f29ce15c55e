//! 用户资料的 HTTP 处理器

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    middleware::{AppJson, AppState},
    models::{envelope::ApiResponse, user::*},
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// 获取自己的资料
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.profile_service.get_profile(auth_context.user_id).await?;

    Ok(Json(ApiResponse::data(json!({ "profile": profile }))))
}

/// 更新资料
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppJson(req): AppJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .profile_service
        .update_profile(auth_context.user_id, req)
        .await?;

    Ok(Json(ApiResponse::with_message(
        "Profile updated successfully",
        json!({ "user": user }),
    )))
}

/// 修改密码
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppJson(req): AppJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .profile_service
        .change_password(auth_context.user_id, req)
        .await?;

    Ok(Json(ApiResponse::<()>::message("Password changed successfully")))
}

/// 停用账户
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let user = state.profile_service.deactivate(auth_context.user_id).await?;

    Ok(Json(ApiResponse::with_message(
        "Account deactivated successfully",
        json!({ "user": user }),
    )))
}

/// 公开资料
pub async fn get_public_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = Uuid::parse_str(&id)
        .map_err(|_| AppError::InvalidParam("Invalid user ID format".to_string()))?;

    let profile = state.profile_service.public_profile(user_id).await?;

    Ok(Json(ApiResponse::data(json!({ "profile": profile }))))
}
