//! Driven port for user persistence.
//!
//! The [`UserStore`] trait is the only way the domain reaches stored users.
//! Adapters own record identity and timestamps: `insert` assigns the next id
//! from a monotonic counter and stamps `created_at`, and ids are never handed
//! out twice within the lifetime of a store.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::{NewUser, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user store adapters.
    pub enum UserStoreError {
        /// A live record already holds the username or email.
        Duplicate { message: String } => "user store uniqueness violated: {message}",
        /// Store connection could not be established.
        Connection { message: String } => "user store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user store query failed: {message}",
    }
}

/// Port for user storage and retrieval.
///
/// Every mutating call must be durable before it returns. Readers never see
/// a partially written record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a validated user, assigning its id and insert timestamp.
    ///
    /// Fails with [`UserStoreError::Duplicate`] when another live record
    /// already holds the username or the email.
    async fn insert(&self, user: NewUser) -> Result<User, UserStoreError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserStoreError>;

    /// Fetch a user by exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserStoreError>;

    /// Return every live user, newest first.
    async fn list_all(&self) -> Result<Vec<User>, UserStoreError>;

    /// Delete a user by identifier.
    ///
    /// Returns whether a record was removed. Deleting an absent id is not an
    /// error.
    async fn delete_by_id(&self, id: UserId) -> Result<bool, UserStoreError>;

    /// Delete every user, returning the number of removed records.
    async fn delete_all(&self) -> Result<u64, UserStoreError>;
}

#[derive(Debug, Default)]
struct InMemoryState {
    last_id: i64,
    users: BTreeMap<UserId, User>,
}

/// Mutex-guarded store kept entirely in process memory.
///
/// Useful for domain tests and demos that do not need durability.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use mockable::DefaultClock;
/// use user_registry::domain::ports::{InMemoryUserStore, UserStore};
/// use user_registry::domain::{RegistrationRequest, validation::validate};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = InMemoryUserStore::new(Arc::new(DefaultClock));
/// let new_user = validate(&RegistrationRequest::new("ada", "ada@example.com", 36)).unwrap();
/// let user = store.insert(new_user).await.unwrap();
/// assert_eq!(user.id().get(), 1);
/// # });
/// ```
pub struct InMemoryUserStore {
    state: Mutex<InMemoryState>,
    clock: Arc<dyn Clock>,
}

impl InMemoryUserStore {
    /// Create an empty store stamping records with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(InMemoryState::default()),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, InMemoryState>, UserStoreError> {
        self.state
            .lock()
            .map_err(|_| UserStoreError::connection("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, UserStoreError> {
        let mut state = self.lock()?;
        let clash = state
            .users
            .values()
            .any(|existing| existing.username() == user.username() || existing.email() == user.email());
        if clash {
            return Err(UserStoreError::duplicate(format!(
                "username '{}' or email '{}' is taken",
                user.username(),
                user.email()
            )));
        }

        state.last_id += 1;
        let id = UserId::new(state.last_id);
        let stored = user.into_user(id, self.clock.utc());
        state.users.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserStoreError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserStoreError> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|user| user.username() == username)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserStoreError> {
        let mut users: Vec<User> = self.lock()?.users.values().cloned().collect();
        users.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(users)
    }

    async fn delete_by_id(&self, id: UserId) -> Result<bool, UserStoreError> {
        Ok(self.lock()?.users.remove(&id).is_some())
    }

    async fn delete_all(&self) -> Result<u64, UserStoreError> {
        let mut state = self.lock()?;
        let removed = u64::try_from(state.users.len()).unwrap_or(u64::MAX);
        state.users.clear();
        Ok(removed)
    }
}
