//! 用户资料服务：资料查询与更新、修改密码、停用账户

use crate::{
    auth::password::PasswordHasher,
    config::SecurityConfig,
    error::{AppError, AuthError},
    models::user::*,
    repository::UserRepository,
};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub struct ProfileService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<PasswordHasher>,
    policy: SecurityConfig,
}

impl ProfileService {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        hasher: Arc<PasswordHasher>,
        policy: SecurityConfig,
    ) -> Self {
        Self {
            repository,
            hasher,
            policy,
        }
    }

    /// 获取自己的资料（仅活跃用户）
    pub async fn get_profile(&self, user_id: Uuid) -> Result<ProfileResponse, AppError> {
        self.repository
            .find_by_id(user_id)
            .await?
            .filter(|user| user.is_active)
            .map(ProfileResponse::from)
            .ok_or(AppError::ProfileNotFound)
    }

    /// 更新资料，profile_data 深度合并到已有数据
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        req: UpdateProfileRequest,
    ) -> Result<UserResponse, AppError> {
        let req = req.normalized();
        req.validate()?;

        let user = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let mut changes = UserChanges::touch(Utc::now());
        changes.name = req.name;

        if let Some(update) = req.profile_data {
            let patch = serde_json::to_value(update)
                .map_err(|e| AppError::Internal(format!("Failed to encode profile: {}", e)))?;
            let mut merged = user.profile_data;
            merge_json(&mut merged, patch);
            changes.profile_data = Some(merged);
        }

        let updated = self
            .repository
            .update_by_id(user_id, changes)
            .await?
            .ok_or(AppError::UpdateFailed)?;

        tracing::info!(user_id = %user_id, "Profile updated");
        Ok(UserResponse::from(updated))
    }

    /// 修改密码
    pub async fn change_password(
        &self,
        user_id: Uuid,
        req: ChangePasswordRequest,
    ) -> Result<(), AppError> {
        let current = req
            .current_password
            .filter(|p| !p.is_empty())
            .ok_or(AppError::MissingField("currentPassword"))?;
        let new = req
            .new_password
            .filter(|p| !p.is_empty())
            .ok_or(AppError::MissingField("newPassword"))?;

        let user = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !super::verify_password(&self.hasher, current, user.password_hash).await? {
            return Err(AuthError::InvalidCurrentPassword.into());
        }

        PasswordHasher::validate_password_policy(&new, &self.policy)?;

        let mut changes = UserChanges::touch(Utc::now());
        changes.password_hash = Some(super::hash_password(&self.hasher, new).await?);

        self.repository
            .update_by_id(user_id, changes)
            .await?
            .ok_or(AppError::UpdateFailed)?;

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// 停用账户（已签发的令牌在过期前仍然有效）
    pub async fn deactivate(&self, user_id: Uuid) -> Result<UserResponse, AppError> {
        if self.repository.find_by_id(user_id).await?.is_none() {
            return Err(AppError::UserNotFound);
        }

        let mut changes = UserChanges::touch(Utc::now());
        changes.is_active = Some(false);

        let user = self
            .repository
            .update_by_id(user_id, changes)
            .await?
            .ok_or(AppError::UpdateFailed)?;

        tracing::info!(user_id = %user_id, "Account deactivated");
        Ok(UserResponse::from(user))
    }

    /// 公开资料
    pub async fn public_profile(&self, user_id: Uuid) -> Result<PublicProfile, AppError> {
        self.repository
            .find_by_id(user_id)
            .await?
            .filter(|user| user.is_active)
            .map(PublicProfile::from)
            .ok_or(AppError::UserNotFound)
    }
}

/// 对象逐键递归合并，其余类型直接覆盖
fn merge_json(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}
