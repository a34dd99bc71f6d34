//! Validation rule set applied before any store mutation.
//!
//! The rules are pure and fail fast: the first violated rule is reported and
//! no further checks run.

use std::fmt;

use crate::domain::{NewUser, RegistrationRequest};

/// Youngest accepted age, inclusive.
pub const MIN_AGE: i64 = 1;
/// Oldest accepted age, inclusive.
pub const MAX_AGE: i64 = 150;

/// Registration field names, in the order the presence rule inspects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationField {
    /// The `username` field.
    Username,
    /// The `email` field.
    Email,
    /// The `age` field.
    Age,
}

impl RegistrationField {
    /// Wire name of the field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Age => "age",
        }
    }
}

impl fmt::Display for RegistrationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First rule violated by a registration request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    /// A required field is absent or blank.
    #[error("Username, email, and age are required")]
    MissingField {
        /// The first absent field.
        field: RegistrationField,
    },
    /// The age lies outside the accepted range.
    #[error("Age must be between {} and {}", MIN_AGE, MAX_AGE)]
    AgeOutOfRange {
        /// The rejected age.
        age: i64,
    },
}

impl ValidationFailure {
    /// Machine-readable code used in error details.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "missing_field",
            Self::AgeOutOfRange { .. } => "age_out_of_range",
        }
    }

    /// Field the failure refers to.
    pub const fn field(&self) -> RegistrationField {
        match self {
            Self::MissingField { field } => *field,
            Self::AgeOutOfRange { .. } => RegistrationField::Age,
        }
    }
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|text| !text.trim().is_empty())
}

/// Check a registration request against the rule set.
///
/// # Examples
/// ```
/// use user_registry::domain::RegistrationRequest;
/// use user_registry::domain::validation::{validate, ValidationFailure};
///
/// let ok = validate(&RegistrationRequest::new("ada", "ada@example.com", 36));
/// assert!(ok.is_ok());
///
/// let err = validate(&RegistrationRequest::new("ada", "ada@example.com", 151));
/// assert_eq!(err, Err(ValidationFailure::AgeOutOfRange { age: 151 }));
/// ```
pub fn validate(request: &RegistrationRequest) -> Result<NewUser, ValidationFailure> {
    let Some(username) = present(request.username.as_ref()) else {
        return Err(ValidationFailure::MissingField {
            field: RegistrationField::Username,
        });
    };
    let Some(email) = present(request.email.as_ref()) else {
        return Err(ValidationFailure::MissingField {
            field: RegistrationField::Email,
        });
    };
    let Some(age) = request.age else {
        return Err(ValidationFailure::MissingField {
            field: RegistrationField::Age,
        });
    };

    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(ValidationFailure::AgeOutOfRange { age });
    }
    let age = u8::try_from(age).map_err(|_| ValidationFailure::AgeOutOfRange { age })?;

    Ok(NewUser::from_validated(
        username.to_owned(),
        email.to_owned(),
        age,
    ))
}
