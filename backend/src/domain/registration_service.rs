//! User registration domain service.
//!
//! This module implements the [`UserRegistry`] driving port over any
//! [`UserStore`]. Validation always runs before the store is touched, so the
//! store's own uniqueness constraint only ever sees well-formed input.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{UserRegistry, UserStore, UserStoreError};
use crate::domain::validation::{ValidationFailure, validate};
use crate::domain::{Error, RegistrationRequest, User, UserId};

/// Message returned when a lookup finds no live record.
pub const USER_NOT_FOUND: &str = "User not found";
/// Message returned when the store reports a uniqueness violation.
pub const USER_EXISTS: &str = "Username or email already exists";

/// Registration service implementing the driving port.
#[derive(Clone)]
pub struct RegistrationService<S> {
    store: Arc<S>,
}

impl<S> RegistrationService<S> {
    /// Create a new service over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> RegistrationService<S>
where
    S: UserStore,
{
    fn map_store_error(error: UserStoreError) -> Error {
        match error {
            UserStoreError::Duplicate { message } => {
                debug!(%message, "registration rejected as duplicate");
                Error::conflict(USER_EXISTS)
            }
            UserStoreError::Connection { message } => {
                warn!(%message, "user store unavailable");
                Error::service_unavailable(format!("user store unavailable: {message}"))
            }
            UserStoreError::Query { message } => {
                warn!(%message, "user store query failed");
                Error::internal(format!("user store error: {message}"))
            }
        }
    }

    fn map_validation_failure(failure: &ValidationFailure) -> Error {
        Error::invalid_request(failure.to_string()).with_details(json!({
            "field": failure.field().as_str(),
            "code": failure.code(),
        }))
    }

    fn found(user: Option<User>) -> Result<User, Error> {
        user.ok_or_else(|| Error::not_found(USER_NOT_FOUND))
    }
}

#[async_trait]
impl<S> UserRegistry for RegistrationService<S>
where
    S: UserStore,
{
    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.store.list_all().await.map_err(Self::map_store_error)
    }

    async fn get_user(&self, id: UserId) -> Result<User, Error> {
        let user = self
            .store
            .find_by_id(id)
            .await
            .map_err(Self::map_store_error)?;
        Self::found(user)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, Error> {
        let user = self
            .store
            .find_by_username(username)
            .await
            .map_err(Self::map_store_error)?;
        Self::found(user)
    }

    async fn create_user(&self, request: RegistrationRequest) -> Result<User, Error> {
        let new_user = validate(&request).map_err(|failure| {
            debug!(field = %failure.field(), code = failure.code(), "registration failed validation");
            Self::map_validation_failure(&failure)
        })?;

        let user = self
            .store
            .insert(new_user)
            .await
            .map_err(Self::map_store_error)?;
        info!(user_id = %user.id(), username = user.username(), "user registered");
        Ok(user)
    }

    async fn delete_user(&self, id: UserId) -> Result<(), Error> {
        let removed = self
            .store
            .delete_by_id(id)
            .await
            .map_err(Self::map_store_error)?;
        debug!(user_id = %id, removed, "user delete processed");
        Ok(())
    }

    async fn delete_all_users(&self) -> Result<(), Error> {
        let removed = self
            .store
            .delete_all()
            .await
            .map_err(Self::map_store_error)?;
        info!(removed, "all users deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "registration_service_tests.rs"]
mod tests;
