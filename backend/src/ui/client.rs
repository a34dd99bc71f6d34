//! Reqwest-backed registration client used by the form controller.
//!
//! The adapter owns transport details only: request serialisation, timeout,
//! and decoding the success or failure envelope returned by `POST /api/users`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::domain::ports::define_port_error;
use crate::domain::{RegistrationRequest, User};

define_port_error! {
    /// Reasons a registration call produced no user.
    pub enum RegistrationApiError {
        /// The server answered with a failure envelope; `message` is shown as-is.
        Rejected { status: u16, message: String } => "{message}",
        /// The request never completed.
        Transport { message: String } => "registration request failed: {message}",
        /// The server answered with a body the client could not interpret.
        Decode { message: String } => "invalid registration response: {message}",
    }
}

/// Port through which the form submits registrations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationApi: Send + Sync {
    /// Submit a registration and return the stored record.
    async fn create_user(
        &self,
        request: &RegistrationRequest,
    ) -> Result<User, RegistrationApiError>;
}

/// Body shared by the success and failure responses of `POST /api/users`.
#[derive(Debug, Deserialize)]
struct CreateEnvelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    user: Option<User>,
}

/// Registration client that talks to a running server over HTTP.
pub struct HttpRegistrationApi {
    client: Client,
    users_url: Url,
}

impl HttpRegistrationApi {
    /// Build a client for the server rooted at `base_url`.
    ///
    /// # Errors
    /// Returns [`RegistrationApiError::Transport`] when the reqwest client
    /// cannot be constructed or the users URL cannot be derived.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, RegistrationApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RegistrationApiError::transport(e.to_string()))?;
        let users_url = base_url
            .join("/api/users")
            .map_err(|e| RegistrationApiError::transport(e.to_string()))?;
        Ok(Self { client, users_url })
    }
}

#[async_trait]
impl RegistrationApi for HttpRegistrationApi {
    async fn create_user(
        &self,
        request: &RegistrationRequest,
    ) -> Result<User, RegistrationApiError> {
        let response = self
            .client
            .post(self.users_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        decode_created(status, body.as_ref())
    }
}

fn map_transport_error(error: reqwest::Error) -> RegistrationApiError {
    RegistrationApiError::transport(error.to_string())
}

fn decode_created(status: StatusCode, body: &[u8]) -> Result<User, RegistrationApiError> {
    let envelope: CreateEnvelope = serde_json::from_slice(body).map_err(|e| {
        if status.is_success() {
            RegistrationApiError::decode(e.to_string())
        } else {
            RegistrationApiError::rejected(status.as_u16(), format!("status {}", status.as_u16()))
        }
    })?;

    match envelope {
        CreateEnvelope {
            success: true,
            user: Some(user),
            ..
        } if status.is_success() => Ok(user),
        CreateEnvelope {
            success: true, ..
        } if status.is_success() => Err(RegistrationApiError::decode("success without user")),
        CreateEnvelope { message, .. } => Err(RegistrationApiError::rejected(
            status.as_u16(),
            message.unwrap_or_else(|| format!("status {}", status.as_u16())),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn body(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).expect("serialise body")
    }

    #[rstest]
    fn created_envelope_yields_the_returned_user() {
        let payload = body(json!({
            "success": true,
            "message": "User created successfully",
            "user": {
                "id": 3,
                "username": "ada",
                "email": "ada@example.com",
                "age": 36,
                "created_at": "2026-03-01T12:00:00Z"
            }
        }));

        let user = decode_created(StatusCode::CREATED, &payload).expect("user decoded");

        assert_eq!(user.id().get(), 3);
        assert_eq!(user.username(), "ada");
        assert_eq!(user.age(), 36);
    }

    #[rstest]
    #[case(StatusCode::BAD_REQUEST, "Age must be between 1 and 150")]
    #[case(StatusCode::CONFLICT, "Username or email already exists")]
    fn failure_envelope_message_is_kept_verbatim(#[case] status: StatusCode, #[case] message: &str) {
        let payload = body(json!({ "success": false, "code": "x", "message": message }));

        let err = decode_created(status, &payload).expect_err("rejected");

        assert_eq!(err, RegistrationApiError::rejected(status.as_u16(), message));
        assert_eq!(err.to_string(), message);
    }

    #[rstest]
    fn non_json_failure_reports_the_status() {
        let err = decode_created(StatusCode::BAD_GATEWAY, b"<html>").expect_err("rejected");

        assert_eq!(err.to_string(), "status 502");
    }

    #[rstest]
    #[case(b"not json".to_vec())]
    #[case(body(json!({ "success": true })))]
    fn malformed_success_is_a_decode_error(#[case] payload: Vec<u8>) {
        let err = decode_created(StatusCode::CREATED, &payload).expect_err("decode error");

        assert!(matches!(err, RegistrationApiError::Decode { .. }));
    }

    #[rstest]
    fn users_url_is_derived_from_base() {
        let base = Url::parse("http://127.0.0.1:3000/").expect("url");
        let api = HttpRegistrationApi::new(&base, Duration::from_secs(1)).expect("client");

        assert_eq!(api.users_url.as_str(), "http://127.0.0.1:3000/api/users");
    }
}
