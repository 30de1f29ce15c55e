//! JWT 认证中间件

use crate::{
    auth::jwt::JwtService,
    error::{AppError, AuthError},
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

/// 认证上下文（附加到请求扩展）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
}

// 实现 FromRequestParts 以便在 handler 中直接提取 AuthContext
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AppError::Auth(AuthError::MissingToken))
    }
}

/// 从 Authorization 头提取令牌
///
/// 头必须严格为 `Bearer <token>`。
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let value = value.to_str().map_err(|_| AuthError::InvalidTokenFormat)?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::InvalidTokenFormat),
    }
}

/// 校验请求头并解析出调用者身份
pub fn authorize(headers: &HeaderMap, jwt_service: &JwtService) -> Result<AuthContext, AuthError> {
    let token = extract_token(headers)?;

    let claims = jwt_service
        .validate(token)
        .map_err(AuthError::InvalidToken)?;

    Ok(AuthContext {
        user_id: claims.user_id,
        email: claims.email,
        name: claims.name,
    })
}

/// JWT 认证中间件 - 必须认证
pub async fn jwt_auth_middleware(
    State(jwt_service): State<Arc<JwtService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_context = authorize(req.headers(), &jwt_service).map_err(|e| {
        tracing::debug!(reason = %e, uri = %req.uri().path(), "Request not authorized");
        AppError::Auth(e)
    })?;

    tracing::debug!(user_id = %auth_context.user_id, "Request authorized");

    // 附加到请求扩展
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{SessionIdentity, TokenError};
    use crate::config::SecurityConfig;
    use chrono::{Duration, Utc};
    use secrecy::Secret;

    fn jwt_service() -> JwtService {
        JwtService::from_config(&SecurityConfig {
            jwt_secret: Secret::new("test_secret_key_32_characters_long!".to_string()),
            token_exp_secs: 604800,
            password_min_length: 8,
            password_require_uppercase: true,
            password_require_digit: true,
            password_require_special: false,
            password_hash_memory_kib: 19456,
            password_hash_iterations: 2,
            password_hash_parallelism: 1,
        })
        .unwrap()
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_extract_token_valid() {
        let headers = headers_with("Bearer test_token_123");
        assert_eq!(extract_token(&headers).unwrap(), "test_token_123");
    }

    #[test]
    fn test_extract_token_missing() {
        let headers = HeaderMap::new();
        assert!(matches!(extract_token(&headers), Err(AuthError::MissingToken)));
    }

    #[test]
    fn test_extract_token_invalid_format() {
        for value in [
            "InvalidFormat",
            "Basic xyz",
            "Bearer",
            "Bearer ",
            "bearer abc",
            "Bearer abc def",
            "Bearer  abc",
        ] {
            let headers = headers_with(value);
            assert!(
                matches!(extract_token(&headers), Err(AuthError::InvalidTokenFormat)),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_authorize_resolves_identity() {
        let service = jwt_service();
        let identity = SessionIdentity {
            user_id: Uuid::new_v4(),
            email: "ann@x.com".to_string(),
            name: "Ann".to_string(),
        };
        let token = service.issue(&identity).unwrap();

        let context = authorize(&headers_with(&format!("Bearer {token}")), &service).unwrap();
        assert_eq!(context.user_id, identity.user_id);
        assert_eq!(context.email, "ann@x.com");
        assert_eq!(context.name, "Ann");
    }

    #[test]
    fn test_authorize_expired_token() {
        let service = jwt_service();
        let identity = SessionIdentity {
            user_id: Uuid::new_v4(),
            email: "ann@x.com".to_string(),
            name: "Ann".to_string(),
        };
        let token = service
            .issue_until(&identity, Utc::now() - Duration::minutes(5))
            .unwrap();

        let result = authorize(&headers_with(&format!("Bearer {token}")), &service);
        assert!(matches!(
            result,
            Err(AuthError::InvalidToken(TokenError::Expired))
        ));
    }
}
