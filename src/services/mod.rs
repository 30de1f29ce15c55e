//! Business logic services layer

pub mod auth_service;
pub mod profile_service;

pub use auth_service::AuthService;
pub use profile_service::ProfileService;

use crate::{auth::password::PasswordHasher, error::AppError};
use std::sync::Arc;

/// Run Argon2 hashing off the async worker threads
pub(crate) async fn hash_password(
    hasher: &Arc<PasswordHasher>,
    password: String,
) -> Result<String, AppError> {
    let hasher = hasher.clone();
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
}

/// Blocking-pool counterpart of [`PasswordHasher::verify`]
pub(crate) async fn verify_password(
    hasher: &Arc<PasswordHasher>,
    password: String,
    hash: String,
) -> Result<bool, AppError> {
    let hasher = hasher.clone();
    tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))?
}
