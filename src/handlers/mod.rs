//! HTTP 处理器模块

pub mod auth;
pub mod health;
pub mod user;

use crate::error::AppError;

/// 未匹配路由
pub async fn not_found() -> AppError {
    AppError::RouteNotFound
}

/// 路径存在但方法不匹配
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
