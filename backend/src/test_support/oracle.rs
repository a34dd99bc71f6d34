//! Independent backend client that checks what the form rendered.
//!
//! The oracle never trusts the form: after each UI action it re-reads the
//! resource through the HTTP API and compares field for field. Cleanup only
//! removes ids the oracle was told about.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use crate::domain::ports::define_port_error;
use crate::domain::{User, UserId};
use crate::ui::RenderedUser;

define_port_error! {
    /// Failures while talking to the backend under test.
    pub enum OracleError {
        /// The request did not complete.
        Transport { message: String } => "oracle request failed: {message}",
        /// The backend answered with a status the oracle does not accept.
        UnexpectedStatus { status: u16, url: String } => "unexpected status {status} from {url}",
        /// The backend answered with an unreadable body.
        Decode { message: String } => "oracle could not decode response: {message}",
    }
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: User,
}

#[derive(Deserialize)]
struct UserListEnvelope {
    users: Vec<User>,
}

/// HTTP client reading the store through the public API.
pub struct BackendOracle {
    client: Client,
    base_url: Url,
    created: Mutex<Vec<UserId>>,
}

impl BackendOracle {
    /// Build an oracle for the server rooted at `base_url`.
    ///
    /// # Errors
    /// Returns [`OracleError::Transport`] when the client cannot be built.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OracleError::transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.clone(),
            created: Mutex::new(Vec::new()),
        })
    }

    /// `{base}/api/users/{tail...}` with each tail item as one encoded segment.
    fn users_url(&self, tail: &[&str]) -> Result<Url, OracleError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| OracleError::transport(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "users"])
            .extend(tail);
        Ok(url)
    }

    async fn fetch_user(&self, url: Url) -> Result<Option<User>, OracleError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| OracleError::transport(e.to_string()))?;
        match response.status() {
            StatusCode::OK => {
                let envelope: UserEnvelope = response
                    .json()
                    .await
                    .map_err(|e| OracleError::decode(e.to_string()))?;
                Ok(Some(envelope.user))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(OracleError::unexpected_status(status.as_u16(), url.as_str())),
        }
    }

    /// `GET /api/users/{id}`; `None` when the store has no such record.
    ///
    /// # Errors
    /// Returns [`OracleError`] on transport failures or statuses other than
    /// 200 and 404.
    pub async fn fetch_by_id(&self, id: UserId) -> Result<Option<User>, OracleError> {
        self.fetch_user(self.users_url(&[id.to_string().as_str()])?).await
    }

    /// `GET /api/users/username/{username}`; `None` when absent.
    ///
    /// # Errors
    /// Returns [`OracleError`] on transport failures or statuses other than
    /// 200 and 404.
    pub async fn fetch_by_username(&self, username: &str) -> Result<Option<User>, OracleError> {
        self.fetch_user(self.users_url(&["username", username])?)
            .await
    }

    /// `GET /api/users`, newest first.
    ///
    /// # Errors
    /// Returns [`OracleError`] on transport failures or a non-200 status.
    pub async fn list(&self) -> Result<Vec<User>, OracleError> {
        let url = self.users_url(&[])?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| OracleError::transport(e.to_string()))?;
        if response.status() != StatusCode::OK {
            return Err(OracleError::unexpected_status(
                response.status().as_u16(),
                url.as_str(),
            ));
        }
        let envelope: UserListEnvelope = response
            .json()
            .await
            .map_err(|e| OracleError::decode(e.to_string()))?;
        Ok(envelope.users)
    }

    /// `DELETE /api/users/{id}`, which succeeds whether or not the id exists.
    ///
    /// # Errors
    /// Returns [`OracleError`] on transport failures or a non-200 status.
    pub async fn delete(&self, id: UserId) -> Result<(), OracleError> {
        let url = self.users_url(&[id.to_string().as_str()])?;
        let response = self
            .client
            .delete(url.clone())
            .send()
            .await
            .map_err(|e| OracleError::transport(e.to_string()))?;
        if response.status() != StatusCode::OK {
            return Err(OracleError::unexpected_status(
                response.status().as_u16(),
                url.as_str(),
            ));
        }
        Ok(())
    }

    /// Remember an id this test created so [`Self::cleanup`] removes it.
    pub fn record_created(&self, id: UserId) {
        let mut created = self.created.lock().unwrap_or_else(PoisonError::into_inner);
        if !created.contains(&id) {
            created.push(id);
        }
    }

    /// Delete every recorded id and forget them. Returns how many were sent.
    ///
    /// # Errors
    /// Returns the first [`OracleError`] raised by a delete; ids not yet
    /// deleted stay recorded.
    pub async fn cleanup(&self) -> Result<usize, OracleError> {
        let ids: Vec<UserId> = self
            .created
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for (done, id) in ids.iter().enumerate() {
            if let Err(error) = self.delete(*id).await {
                self.created
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .retain(|kept| !ids.iter().take(done).any(|gone| gone == kept));
                return Err(error);
            }
            debug!(user_id = %id, "cleaned up test user");
        }
        self.created
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|kept| !ids.contains(kept));
        Ok(ids.len())
    }

    /// Re-read the rendered user by id and assert every field matches.
    ///
    /// The id is recorded for cleanup. Returns the stored record.
    ///
    /// # Panics
    /// Panics when the record is missing or any field differs.
    pub async fn assert_matches_rendered(&self, rendered: &RenderedUser) -> User {
        let id: UserId = rendered
            .id
            .parse()
            .unwrap_or_else(|e| panic!("rendered id {:?} is not numeric: {e}", rendered.id));
        self.record_created(id);

        let stored = self
            .fetch_by_id(id)
            .await
            .unwrap_or_else(|e| panic!("re-query of user {id} failed: {e}"))
            .unwrap_or_else(|| panic!("user {id} shown by the form is not stored"));
        assert_eq!(
            RenderedUser::from(&stored),
            *rendered,
            "stored user differs from what the form rendered"
        );
        stored
    }

    /// Assert the store holds no user with `username`.
    ///
    /// # Panics
    /// Panics when such a user exists or the lookup fails.
    pub async fn assert_username_absent(&self, username: &str) {
        let found = self
            .fetch_by_username(username)
            .await
            .unwrap_or_else(|e| panic!("lookup of {username} failed: {e}"));
        if let Some(user) = found {
            self.record_created(user.id());
            panic!("user {username} should not be stored, found id {}", user.id());
        }
    }
}
