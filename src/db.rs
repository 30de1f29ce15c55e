//! 存储初始化
//! 根据配置选择 PostgreSQL 或内存后端，负责连接池、迁移与健康检查

use crate::config::DatabaseConfig;
use crate::repository::{InMemoryUserRepository, PgUserRepository, UserRepository};
use secrecy::ExposeSecret;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;

/// 按配置构建用户仓储
///
/// postgres 后端会建立连接池并执行迁移；memory 后端不做任何 IO。
pub async fn connect_repository(
    config: &DatabaseConfig,
) -> Result<Arc<dyn UserRepository>, DbError> {
    if config.is_memory() {
        tracing::warn!("Using in-memory user repository, data is lost on restart");
        return Ok(Arc::new(InMemoryUserRepository::new()));
    }

    let pool = create_pool(config).await?;
    run_migrations(&pool).await?;

    Ok(Arc::new(PgUserRepository::new(pool)))
}

/// 创建数据库连接池
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    tracing::debug!("Creating database connection pool...");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .test_before_acquire(true)
        .connect(config.url.expose_secret())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create database pool: {}", e);
            DbError::ConnectionFailed(e.to_string())
        })?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database pool created"
    );

    Ok(pool)
}

/// 运行数据库迁移（users 表与邮箱唯一索引）
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        tracing::error!("Migration failed: {}", e);
        DbError::MigrationFailed(e.to_string())
    })?;

    tracing::info!("Migrations completed");
    Ok(())
}

/// 数据库健康检查，同时上报连接池指标
pub async fn health_check(pool: &PgPool) -> HealthStatus {
    metrics::gauge!("db_pool_size").set(pool.size() as f64);
    metrics::gauge!("db_pool_idle").set(pool.num_idle() as f64);

    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => HealthStatus::Healthy,
        Err(e) => {
            tracing::warn!("Database health check failed: {}", e);
            HealthStatus::Unhealthy(e.to_string())
        }
    }
}

/// 数据库错误类型
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

/// 健康状态
#[derive(Debug, Clone)]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn memory_config() -> DatabaseConfig {
        DatabaseConfig {
            backend: "memory".to_string(),
            url: Secret::new(String::new()),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout_secs: 1,
            idle_timeout_secs: 1,
            max_lifetime_secs: 1,
        }
    }

    #[tokio::test]
    async fn test_memory_backend_needs_no_database() {
        let repo = connect_repository(&memory_config()).await.unwrap();
        assert!(repo.ping().await.is_ok());
        assert!(repo.find_by_email("nobody@x.com").await.unwrap().is_none());
    }

    #[test]
    fn test_health_status() {
        let unhealthy = HealthStatus::Unhealthy("Connection refused".to_string());

        match unhealthy {
            HealthStatus::Unhealthy(msg) => assert_eq!(msg, "Connection refused"),
            HealthStatus::Healthy => panic!("expected unhealthy"),
        }
    }
}
