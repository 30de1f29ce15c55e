//! In-memory user repository, for development and tests

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

use super::{RepositoryError, RepositoryResult, UserRepository};
use crate::models::user::{NewUser, User, UserChanges};

/// Users keyed by id, with a secondary unique index on lowercased email
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: DashMap<Uuid, User>,
    emails: DashMap<String, Uuid>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let Some(id) = self.emails.get(&email.to_lowercase()).map(|entry| *entry.value()) else {
            return Ok(None);
        };

        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, user: NewUser) -> RepositoryResult<User> {
        let id = Uuid::new_v4();

        // the email entry guard makes check-and-claim atomic
        match self.emails.entry(user.email.to_lowercase()) {
            Entry::Occupied(_) => {
                return Err(RepositoryError::Conflict(format!(
                    "duplicate key value violates unique constraint: email={}",
                    user.email
                )))
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        let stored = User {
            id,
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_login: None,
            profile_data: user.profile_data,
        };
        self.users.insert(id, stored.clone());

        Ok(stored)
    }

    async fn update_by_id(&self, id: Uuid, changes: UserChanges) -> RepositoryResult<Option<User>> {
        let Some(mut entry) = self.users.get_mut(&id) else {
            return Ok(None);
        };

        let user = entry.value_mut();
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(is_active) = changes.is_active {
            user.is_active = is_active;
        }
        if let Some(last_login) = changes.last_login {
            user.last_login = Some(last_login);
        }
        if let Some(profile_data) = changes.profile_data {
            user.profile_data = profile_data;
        }
        user.updated_at = changes.updated_at;

        Ok(Some(user.clone()))
    }
}
