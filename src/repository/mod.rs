//! User repository layer
//!
//! The services talk to storage only through [`UserRepository`], so the
//! PostgreSQL backend can be swapped for the in-memory one in development and
//! tests.

pub mod memory;
pub mod user_repo;

pub use memory::InMemoryUserRepository;
pub use user_repo::PgUserRepository;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::user::{NewUser, User, UserChanges};

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur in repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Repository unavailable: {0}")]
    Unavailable(String),
}

/// Storage for user records
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by normalized email
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    /// Find a user by id
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>>;

    /// Insert a new user and return the stored row
    async fn insert(&self, user: NewUser) -> RepositoryResult<User>;

    /// Apply a partial update; `None` when no row has this id
    async fn update_by_id(&self, id: Uuid, changes: UserChanges) -> RepositoryResult<Option<User>>;

    /// Cheap liveness probe for readiness checks
    async fn ping(&self) -> RepositoryResult<()> {
        Ok(())
    }
}
