//! Password hashing and verification using Argon2id

use crate::{config::SecurityConfig, error::AppError};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

/// Password hasher with configurable parameters
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create hasher with default parameters (OWASP recommended)
    pub fn new() -> Self {
        // m=64MiB, t=3 iterations, p=4 lanes; well above 12 bcrypt rounds
        Self::with_params(Params::new(65536, 3, 4, None).unwrap_or_default())
    }

    /// Create hasher with explicit Argon2 parameters
    pub fn with_params(params: Params) -> Self {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        Self { argon2 }
    }

    /// Create hasher from the security section of the config
    pub fn from_config(config: &SecurityConfig) -> Result<Self, AppError> {
        let params = Params::new(
            config.password_hash_memory_kib,
            config.password_hash_iterations,
            config.password_hash_parallelism,
            None,
        )
        .map_err(|e| AppError::Config(format!("Invalid Argon2 params: {}", e)))?;

        Ok(Self::with_params(params))
    }

    /// Hash a password. The PHC output embeds algorithm, params, salt and digest.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::Internal(format!("Failed to hash password: {}", e))
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch. A hash that cannot be parsed violates
    /// the storage invariant and is reported as an internal error.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            tracing::error!("Failed to parse stored password hash: {:?}", e);
            AppError::Internal(format!("Failed to parse password hash: {}", e))
        })?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => {
                tracing::error!("Failed to verify password: {:?}", e);
                Err(AppError::Internal(format!("Failed to verify password: {}", e)))
            }
        }
    }

    /// Validate password against policy
    pub fn validate_password_policy(password: &str, policy: &SecurityConfig) -> Result<(), AppError> {
        if password.chars().count() < policy.password_min_length {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                policy.password_min_length
            )));
        }

        if policy.password_require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            return Err(AppError::validation(
                "Password must contain at least one uppercase letter",
            ));
        }

        if policy.password_require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::validation("Password must contain at least one digit"));
        }

        if policy.password_require_special && password.chars().all(|c| c.is_alphanumeric()) {
            return Err(AppError::validation(
                "Password must contain at least one special character",
            ));
        }

        Ok(())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
