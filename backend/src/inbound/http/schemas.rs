//! OpenAPI schema definitions for domain types and response envelopes.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the structure of their corresponding domain
//! types but live in the inbound adapter layer where framework concerns belong.

#![expect(
    dead_code,
    reason = "Schema mirrors are used only for OpenAPI generation via utoipa"
)]

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The requested user does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The username or email is already registered.
    #[schema(rename = "conflict")]
    Conflict,
    /// The user store is temporarily unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for the error envelope built from [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
pub struct ErrorSchema {
    /// Always `false` for error responses.
    #[schema(example = false)]
    success: bool,
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message shown to users verbatim.
    #[schema(example = "Age must be between 1 and 150")]
    message: String,
    /// Correlation identifier matching the `trace-id` response header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details such as the offending field.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::User`].
#[derive(ToSchema)]
#[schema(as = crate::domain::User)]
pub struct UserSchema {
    /// Store-assigned identifier.
    #[schema(example = 1)]
    id: i64,
    /// Unique username.
    #[schema(example = "testuser_1")]
    username: String,
    /// Unique email address.
    #[schema(example = "test_1@example.com")]
    email: String,
    /// Age in years, between 1 and 150.
    #[schema(example = 25, minimum = 1, maximum = 150)]
    age: u8,
    /// Insert timestamp in RFC 3339 form.
    #[schema(example = "2026-03-01T12:00:00Z")]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::RegistrationRequest`].
#[derive(ToSchema)]
#[schema(as = crate::domain::RegistrationRequest)]
pub struct RegistrationRequestSchema {
    /// Requested username.
    #[schema(example = "testuser_1")]
    username: Option<String>,
    /// Requested email address.
    #[schema(example = "test_1@example.com")]
    email: Option<String>,
    /// Requested age in years.
    #[schema(example = 25)]
    age: Option<i64>,
}

/// OpenAPI schema for the list response.
#[derive(ToSchema)]
pub struct UserListResponseSchema {
    /// Always `true`.
    success: bool,
    /// Registered users, newest first.
    users: Vec<UserSchema>,
}

/// OpenAPI schema for single-user lookups.
#[derive(ToSchema)]
pub struct UserResponseSchema {
    /// Always `true`.
    success: bool,
    /// The requested user.
    user: UserSchema,
}

/// OpenAPI schema for the create response.
#[derive(ToSchema)]
pub struct CreatedUserResponseSchema {
    /// Always `true`.
    success: bool,
    /// Confirmation message.
    #[schema(example = "User created successfully")]
    message: String,
    /// The stored record, including its id and timestamp.
    user: UserSchema,
}

/// OpenAPI schema for acknowledgement-only responses.
#[derive(ToSchema)]
pub struct MessageResponseSchema {
    /// Always `true`.
    success: bool,
    /// Confirmation message.
    #[schema(example = "User deleted successfully")]
    message: String,
}
