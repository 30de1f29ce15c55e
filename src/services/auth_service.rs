//! 账户服务：注册、登录、当前用户

use crate::{
    auth::jwt::{JwtService, SessionIdentity},
    auth::password::PasswordHasher,
    error::{AppError, AuthError},
    models::{auth::*, user::*},
    repository::{RepositoryError, UserRepository},
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Same bounds as profile updates
const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 50;

pub struct AuthService {
    repository: Arc<dyn UserRepository>,
    jwt_service: Arc<JwtService>,
    hasher: Arc<PasswordHasher>,
}

impl AuthService {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        jwt_service: Arc<JwtService>,
        hasher: Arc<PasswordHasher>,
    ) -> Self {
        Self {
            repository,
            jwt_service,
            hasher,
        }
    }

    /// 注册新用户
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthPayload, AppError> {
        let name = required(req.name.as_deref(), "name")?.trim().to_string();
        let email = normalize_email(required(req.email.as_deref(), "email")?);
        let password = required(req.password.as_deref(), "password")?.to_string();

        let name_len = name.chars().count();
        if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&name_len) {
            return Err(AppError::Validation(format!(
                "name: Name must be between {} and {} characters",
                NAME_MIN_CHARS, NAME_MAX_CHARS
            )));
        }

        // 邮箱已被占用
        if self.repository.find_by_email(&email).await?.is_some() {
            tracing::debug!(%email, "Registration rejected, email taken");
            return Err(AppError::UserExists);
        }

        let password_hash = super::hash_password(&self.hasher, password).await?;

        let now = Utc::now();
        let new_user = NewUser {
            email,
            name,
            password_hash,
            is_active: true,
            created_at: now,
            updated_at: now,
            profile_data: ProfileData::default().into_value(),
        };

        // 并发注册时唯一索引兜底
        let user = self.repository.insert(new_user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AppError::UserExists,
            other => {
                tracing::error!(error = %other, "Failed to insert user");
                AppError::CreationFailed
            }
        })?;

        let access_token = self.jwt_service.issue(&identity_of(&user))?;

        tracing::info!(user_id = %user.id, "User registered");

        Ok(AuthPayload {
            user: UserResponse::from(user),
            tokens: AuthTokens { access_token },
        })
    }

    /// 用户登录
    pub async fn login(&self, req: LoginRequest) -> Result<AuthPayload, AppError> {
        let (email, password) = match (non_empty(req.email), non_empty(req.password)) {
            (Some(email), Some(password)) => (normalize_email(&email), password),
            _ => return Err(AppError::MissingCredentials),
        };

        // 未知邮箱与密码错误返回同一错误
        let user = self
            .repository
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.is_active {
            tracing::info!(user_id = %user.id, "Login attempt on deactivated account");
            return Err(AuthError::AccountDeactivated.into());
        }

        let valid =
            super::verify_password(&self.hasher, password, user.password_hash.clone()).await?;
        if !valid {
            tracing::debug!(user_id = %user.id, "Login rejected, wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let user = self.record_login(user).await;
        let access_token = self.jwt_service.issue(&identity_of(&user))?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(AuthPayload {
            user: UserResponse::from(user),
            tokens: AuthTokens { access_token },
        })
    }

    /// 获取当前用户
    pub async fn current_user(&self, user_id: Uuid) -> Result<UserResponse, AppError> {
        self.repository
            .find_by_id(user_id)
            .await?
            .map(UserResponse::from)
            .ok_or(AppError::UserNotFound)
    }

    /// 更新最近登录时间，失败只记日志
    async fn record_login(&self, user: User) -> User {
        let now = Utc::now();
        let mut changes = UserChanges::touch(now);
        changes.last_login = Some(now);

        match self.repository.update_by_id(user.id, changes).await {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                tracing::warn!(user_id = %user.id, "User vanished while recording login");
                user
            }
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to record last login");
                user
            }
        }
    }
}

fn identity_of(user: &User) -> SessionIdentity {
    SessionIdentity {
        user_id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::MissingField(field)),
    }
}
