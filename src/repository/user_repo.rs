//! User repository (PostgreSQL 数据访问层)

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{RepositoryError, RepositoryResult, UserRepository};
use crate::models::user::{NewUser, User, UserChanges};

pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// 唯一约束冲突转换为 Conflict，其余保持为数据库错误
fn map_write_error(e: sqlx::Error) -> RepositoryError {
    let unique = e
        .as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false);

    if unique {
        RepositoryError::Conflict(e.to_string())
    } else {
        RepositoryError::Database(e)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    /// 根据邮箱查找用户
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1 LIMIT 1")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    /// 根据 ID 查找用户
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    /// 创建用户
    async fn insert(&self, user: NewUser) -> RepositoryResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, password_hash, is_active, created_at, updated_at, profile_data)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(&user.profile_data)
        .fetch_one(&self.db)
        .await
        .map_err(map_write_error)
    }

    /// 更新用户
    async fn update_by_id(&self, id: Uuid, changes: UserChanges) -> RepositoryResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                name = COALESCE($2, name),
                password_hash = COALESCE($3, password_hash),
                is_active = COALESCE($4, is_active),
                last_login = COALESCE($5, last_login),
                profile_data = COALESCE($6, profile_data),
                updated_at = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.password_hash)
        .bind(changes.is_active)
        .bind(changes.last_login)
        .bind(&changes.profile_data)
        .bind(changes.updated_at)
        .fetch_optional(&self.db)
        .await
        .map_err(map_write_error)
    }

    async fn ping(&self) -> RepositoryResult<()> {
        match crate::db::health_check(&self.db).await {
            crate::db::HealthStatus::Healthy => Ok(()),
            crate::db::HealthStatus::Unhealthy(msg) => Err(RepositoryError::Unavailable(msg)),
        }
    }
}
