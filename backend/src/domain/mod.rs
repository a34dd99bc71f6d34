//! Domain primitives, ports and services.
//!
//! Purpose: Define the user registry entities, the validation rule set and the
//! ports adapters plug into. Keep types immutable and document invariants and
//! serialisation contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic failure payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - User / NewUser / RegistrationRequest: the registration data model.
//! - RegistrationService: the driving-port implementation over a store.

pub mod error;
pub mod ports;
pub mod registration_service;
pub mod trace_id;
pub mod user;
pub mod validation;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::registration_service::RegistrationService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{NewUser, RegistrationRequest, User, UserId};
pub use self::validation::{RegistrationField, ValidationFailure};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use user_registry::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::not_found("User not found"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
