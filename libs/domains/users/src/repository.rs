use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UniqueField, UserError, UserResult};
use crate::models::{User, UserFilter};

/// Persistence boundary for users.
///
/// Implementations own conflict detection: a write that would duplicate a
/// nickname or email fails with [`UserError::Conflict`] naming the field and
/// leaves the stored users unchanged.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user under its pre-assigned id.
    async fn add(&self, user: User) -> UserResult<()>;

    /// Replace the mutable fields of the user with `user.id`.
    async fn update(&self, user: User) -> UserResult<()>;

    async fn delete(&self, id: Uuid) -> UserResult<()>;

    /// List users matching `filter`, skipping `offset` rows and returning at
    /// most `limit` (0 = unlimited).
    async fn query(
        &self,
        filter: Option<UserFilter>,
        offset: u64,
        limit: u64,
    ) -> UserResult<Vec<User>>;
}

/// In-memory store, kept in insertion order.
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn conflict(users: &[User], candidate: &User) -> Option<UniqueField> {
        let others = || users.iter().filter(|u| u.id != candidate.id);

        if others().any(|u| u.nickname == candidate.nickname) {
            Some(UniqueField::Nickname)
        } else if others().any(|u| u.email == candidate.email) {
            Some(UniqueField::Email)
        } else {
            None
        }
    }
}

fn accepts(filter: &UserFilter, user: &User) -> bool {
    filter.country.as_ref().is_none_or(|c| &user.country == c)
        && filter.created_from.is_none_or(|from| user.created_at > from)
        && filter.created_to.is_none_or(|to| user.created_at < to)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn add(&self, mut user: User) -> UserResult<()> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.id == user.id) {
            return Err(UserError::Internal(format!("duplicate id {}", user.id)));
        }
        if let Some(field) = Self::conflict(&users, &user) {
            return Err(UserError::Conflict(field));
        }

        let now = Utc::now();
        user.created_at = now;
        user.updated_at = now;
        users.push(user);
        Ok(())
    }

    async fn update(&self, user: User) -> UserResult<()> {
        let mut users = self.users.write().await;

        let index = users
            .iter()
            .position(|u| u.id == user.id)
            .ok_or(UserError::NotFound(user.id))?;

        if let Some(field) = Self::conflict(&users, &user) {
            return Err(UserError::Conflict(field));
        }

        let existing = &mut users[index];
        *existing = User {
            created_at: existing.created_at,
            updated_at: Utc::now(),
            ..user
        };
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> UserResult<()> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);

        if users.len() == before {
            return Err(UserError::NotFound(id));
        }
        Ok(())
    }

    async fn query(
        &self,
        filter: Option<UserFilter>,
        offset: u64,
        limit: u64,
    ) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        let filter = filter.unwrap_or_default();
        let limit = if limit == 0 { usize::MAX } else { limit as usize };

        Ok(users
            .iter()
            .filter(|u| accepts(&filter, u))
            .skip(offset as usize)
            .take(limit)
            .cloned()
            .collect())
    }
}
