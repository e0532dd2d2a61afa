//! Credential store seam.
//!
//! Persistence of users belongs to the CRUD layer around the core. The core
//! only needs existence checks, lookups, and inserts, expressed by
//! [`UserStore`]. [`MemoryUserStore`] is the in-process implementation used
//! by the server binary and the tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::StoreError;
use crate::user::{NewUser, User, UserId};

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// `true` if any user has this username OR this email.
    async fn exists(&self, username: &str, email: &str) -> StoreResult<bool>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Persists a new user and assigns its id.
    ///
    /// Returns [`StoreError::Duplicate`] if the username or email is taken,
    /// even when [`UserStore::exists`] said otherwise a moment earlier.
    async fn insert(&self, user: NewUser) -> StoreResult<User>;
}

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, User>,
    next_id: i64,
}

/// A `UserStore` kept in process memory.
///
/// Uniqueness checks and inserts happen under one lock, so two concurrent
/// registrations for the same email cannot both succeed.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The map is never left half-updated, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn taken(inner: &Inner, username: &str, email: &str) -> bool {
    inner
        .users
        .values()
        .any(|u| u.username == username || u.email == email)
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn exists(&self, username: &str, email: &str) -> StoreResult<bool> {
        Ok(taken(&self.lock(), username, email))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.lock().users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let mut inner = self.lock();
        if taken(&inner, &user.username, &user.email) {
            return Err(StoreError::Duplicate);
        }

        inner.next_id += 1;
        let id = UserId(inner.next_id);
        let user = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: user.created_at,
        };
        inner.users.insert(id, user.clone());
        tracing::debug!("User stored: id={id}, total={}", inner.users.len());
        Ok(user)
    }
}
