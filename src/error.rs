//! 统一错误模型
//! 定义所有错误类型和错误响应格式

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::{auth::jwt::TokenError, models::envelope::ApiResponse, repository::RepositoryError};

/// 结果类型别名
pub type Result<T> = std::result::Result<T, AppError>;

/// 认证失败的具体原因
///
/// 对外统一为 401，但内部保持可区分，便于测试与日志。
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Access token is missing")]
    MissingToken,

    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Invalid token: {0}")]
    InvalidToken(#[source] TokenError),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is deactivated")]
    AccountDeactivated,

    #[error("Current password is incorrect")]
    InvalidCurrentPassword,
}

impl AuthError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::InvalidTokenFormat => "INVALID_TOKEN_FORMAT",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::AccountDeactivated => "ACCOUNT_DEACTIVATED",
            AuthError::InvalidCurrentPassword => "INVALID_CURRENT_PASSWORD",
        }
    }

    /// 对外消息：过期与伪造令牌共用同一条
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidToken(_) => "Invalid or expired token".to_string(),
            other => other.to_string(),
        }
    }
}

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("User with this email already exists")]
    UserExists,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("User not found")]
    UserNotFound,

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("API endpoint not found")]
    RouteNotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Failed to create user")]
    CreationFailed,

    #[error("Failed to update user")]
    UpdateFailed,

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingField(_)
            | AppError::MissingCredentials
            | AppError::Validation(_)
            | AppError::InvalidParam(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UserExists => StatusCode::CONFLICT,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound | AppError::ProfileNotFound | AppError::RouteNotFound => {
                StatusCode::NOT_FOUND
            }
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::CreationFailed
            | AppError::UpdateFailed
            | AppError::Repository(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 获取错误码
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingField(_) => "MISSING_FIELD",
            AppError::MissingCredentials => "MISSING_CREDENTIALS",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidParam(_) => "PARAM_VALIDATION_ERROR",
            AppError::BadRequest(_) => "INVALID_REQUEST",
            AppError::UserExists => "USER_EXISTS",
            AppError::Auth(e) => e.error_code(),
            AppError::UserNotFound => "USER_NOT_FOUND",
            AppError::ProfileNotFound => "PROFILE_NOT_FOUND",
            AppError::RouteNotFound => "NOT_FOUND",
            AppError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            AppError::CreationFailed => "CREATION_FAILED",
            AppError::UpdateFailed => "UPDATE_FAILED",
            AppError::Repository(_) => "PERSISTENCE_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::InvalidParam(msg) | AppError::BadRequest(msg) => {
                msg.clone()
            }
            AppError::Auth(e) => e.user_message(),
            AppError::Repository(_) => "Database error occurred".to_string(),
            AppError::Config(_) => "Configuration error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// 获取 HTTP 状态码数值
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }

    // 便捷方法
    pub fn validation(msg: &str) -> Self {
        AppError::Validation(msg.to_string())
    }

    pub fn internal_error(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(
                status = status.as_u16(),
                code = self.error_code(),
                error = %self,
                "Request failed"
            );
        } else {
            tracing::debug!(
                status = status.as_u16(),
                code = self.error_code(),
                error = %self,
                "Request rejected"
            );
        }

        let body = ApiResponse::error(self.error_code(), self.user_message());

        (status, Json(body)).into_response()
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

/// 请求体无法解析
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// 校验失败
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(format_validation_errors(&errors))
    }
}

/// 把嵌套的校验错误展开为 "field: message" 列表
fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    fn collect(prefix: &str, errors: &validator::ValidationErrors, out: &mut Vec<String>) {
        for (field, kind) in errors.errors() {
            let path = if prefix.is_empty() {
                field.to_string()
            } else {
                format!("{}.{}", prefix, field)
            };
            match kind {
                validator::ValidationErrorsKind::Field(list) => {
                    for err in list {
                        let message = err
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| err.code.to_string());
                        out.push(format!("{}: {}", path, message));
                    }
                }
                validator::ValidationErrorsKind::Struct(inner) => collect(&path, inner, out),
                validator::ValidationErrorsKind::List(items) => {
                    for (index, inner) in items {
                        collect(&format!("{}[{}]", path, index), inner, out);
                    }
                }
            }
        }
    }

    let mut messages = Vec::new();
    collect("", errors, &mut messages);
    messages.sort();
    messages.join("; ")
}
