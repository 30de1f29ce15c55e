//! 错误处理测试
//!
//! 测试错误码、状态码与响应信封

use axum::{http::StatusCode, response::IntoResponse};
use http_body_util::BodyExt;
use space_explorer_api::{
    auth::jwt::TokenError,
    error::{AppError, AuthError},
    repository::RepositoryError,
};

// ==================== 状态码与错误码 ====================

#[test]
fn test_error_status_codes() {
    let cases = [
        (AppError::MissingField("name"), StatusCode::BAD_REQUEST, "MISSING_FIELD"),
        (AppError::MissingCredentials, StatusCode::BAD_REQUEST, "MISSING_CREDENTIALS"),
        (AppError::validation("bad"), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        (
            AppError::InvalidParam("id".to_string()),
            StatusCode::BAD_REQUEST,
            "PARAM_VALIDATION_ERROR",
        ),
        (
            AppError::BadRequest("body".to_string()),
            StatusCode::BAD_REQUEST,
            "INVALID_REQUEST",
        ),
        (AppError::UserExists, StatusCode::CONFLICT, "USER_EXISTS"),
        (AppError::UserNotFound, StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
        (AppError::ProfileNotFound, StatusCode::NOT_FOUND, "PROFILE_NOT_FOUND"),
        (AppError::RouteNotFound, StatusCode::NOT_FOUND, "NOT_FOUND"),
        (
            AppError::MethodNotAllowed,
            StatusCode::METHOD_NOT_ALLOWED,
            "METHOD_NOT_ALLOWED",
        ),
        (AppError::CreationFailed, StatusCode::INTERNAL_SERVER_ERROR, "CREATION_FAILED"),
        (AppError::UpdateFailed, StatusCode::INTERNAL_SERVER_ERROR, "UPDATE_FAILED"),
        (
            AppError::Config("x".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
            "CONFIG_ERROR",
        ),
        (
            AppError::internal_error("x"),
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
        ),
    ];

    for (error, status, code) in cases {
        assert_eq!(error.status_code(), status, "{error:?}");
        assert_eq!(error.error_code(), code, "{error:?}");
    }
}

#[test]
fn test_auth_errors_are_unauthorized() {
    let cases = [
        (AuthError::MissingToken, "MISSING_TOKEN"),
        (AuthError::InvalidTokenFormat, "INVALID_TOKEN_FORMAT"),
        (AuthError::InvalidToken(TokenError::Expired), "INVALID_TOKEN"),
        (AuthError::InvalidCredentials, "INVALID_CREDENTIALS"),
        (AuthError::AccountDeactivated, "ACCOUNT_DEACTIVATED"),
        (AuthError::InvalidCurrentPassword, "INVALID_CURRENT_PASSWORD"),
    ];

    for (error, code) in cases {
        let error = AppError::from(error);
        assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(error.error_code(), code);
    }
}

#[test]
fn test_persistence_error_hides_details() {
    let error = AppError::from(RepositoryError::Unavailable("connection refused to 10.0.0.5".to_string()));

    assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error.error_code(), "PERSISTENCE_ERROR");
    assert!(!error.user_message().contains("10.0.0.5"));
}

// ==================== 响应信封 ====================

#[tokio::test]
async fn test_error_response_envelope() {
    let response = AppError::UserExists.into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "USER_EXISTS");
    assert_eq!(json["message"], "User with this email already exists");
    assert!(json.get("data").is_none());
}

#[tokio::test]
async fn test_internal_error_response_is_generic() {
    let response = AppError::internal_error("stack trace with secrets").into_response();

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["message"], "Internal server error");
}
