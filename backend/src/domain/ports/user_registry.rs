//! Driving port for the user registry use-cases.
//!
//! Inbound adapters (HTTP handlers) call this port without importing any
//! persistence concern. Failures arrive as domain [`Error`] values already
//! classified for the transport.

use async_trait::async_trait;

use crate::domain::{Error, RegistrationRequest, User, UserId};

/// Domain use-case port for registering and looking up users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRegistry: Send + Sync {
    /// Return every registered user, newest first.
    async fn list_users(&self) -> Result<Vec<User>, Error>;

    /// Fetch one user by identifier.
    async fn get_user(&self, id: UserId) -> Result<User, Error>;

    /// Fetch one user by exact username.
    async fn get_user_by_username(&self, username: &str) -> Result<User, Error>;

    /// Validate and persist a registration request.
    async fn create_user(&self, request: RegistrationRequest) -> Result<User, Error>;

    /// Delete one user. Deleting an absent id succeeds.
    async fn delete_user(&self, id: UserId) -> Result<(), Error>;

    /// Delete every user.
    async fn delete_all_users(&self) -> Result<(), Error>;
}
