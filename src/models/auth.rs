//! Authentication-related models

use serde::{Deserialize, Serialize};

use super::user::UserResponse;

/// Registration request. Fields are optional so that a missing field is
/// reported as `MISSING_FIELD` rather than a body rejection.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Tokens handed out on register/login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
}

/// Register/login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPayload {
    pub user: UserResponse,
    pub tokens: AuthTokens,
}
