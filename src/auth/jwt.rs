//! Session token issuance and validation (HS256 JWT)
//!
//! Tokens are stateless: everything needed to authorize a request lives in the
//! claims, and a token stops working only when it expires.

use crate::{config::SecurityConfig, error::AppError};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Wire form of the claims
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
struct Claims {
    user_id: String,
    email: String,
    name: String,
    iat: i64,
    exp: i64,
}

/// Identity a token is issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
}

/// Validated session claims
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub expires_at: DateTime<Utc>,
}

/// Why a token was rejected
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signature is valid but the expiry has been reached
    #[error("token expired")]
    Expired,

    /// Bad signature, unparseable structure or unusable claims
    #[error("malformed or forged token: {0}")]
    Malformed(String),
}

/// JWT service
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl JwtService {
    /// Create JWT service from config
    pub fn from_config(config: &SecurityConfig) -> Result<Self, AppError> {
        let secret = config.jwt_secret.expose_secret();

        // Ensure secret is at least 32 bytes for HS256
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl: Duration::seconds(config.token_exp_secs as i64),
        })
    }

    /// Issue a token that expires after the configured lifetime
    pub fn issue(&self, identity: &SessionIdentity) -> Result<String, AppError> {
        self.issue_until(identity, Utc::now() + self.token_ttl)
    }

    /// Issue a token with an explicit expiry instant
    pub fn issue_until(
        &self,
        identity: &SessionIdentity,
        expires_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let claims = Claims {
            user_id: identity.user_id.to_string(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode session token: {:?}", e);
            AppError::Internal(format!("Failed to encode session token: {}", e))
        })
    }

    /// Validate a token: signature first, then expiry.
    ///
    /// A token is already invalid at its exact expiry second.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // expiry is checked below with a strict `>=` and no leeway
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {:?}", e);
                TokenError::Malformed(e.to_string())
            })?
            .claims;

        if Utc::now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        let user_id = Uuid::parse_str(&claims.user_id)
            .map_err(|_| TokenError::Malformed("userId is not a UUID".to_string()))?;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or_else(|| TokenError::Malformed("exp out of range".to_string()))?;

        Ok(SessionClaims {
            user_id,
            email: claims.email,
            name: claims.name,
            expires_at,
        })
    }
}
