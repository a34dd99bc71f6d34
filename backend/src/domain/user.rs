//! User data model.
//!
//! [`User`] is the only persisted entity. Records are created through the
//! validated [`NewUser`] input and are never edited in place.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned user identifier.
///
/// Identifiers increase monotonically and are never reused within the
/// lifetime of a store, even after the owning record is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw store identifier.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Access the raw integer value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Registration input that already passed the validation rule set.
///
/// Only [`crate::domain::validation::validate`] produces values of this type,
/// so a store write can never receive unchecked input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    username: String,
    email: String,
    age: u8,
}

impl NewUser {
    pub(crate) fn from_validated(username: String, email: String, age: u8) -> Self {
        Self {
            username,
            email,
            age,
        }
    }

    /// Requested username.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Requested email address.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Requested age in years.
    pub fn age(&self) -> u8 {
        self.age
    }

    /// Combine the validated input with store-assigned fields.
    pub fn into_user(self, id: UserId, created_at: DateTime<Utc>) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
            age: self.age,
            created_at,
        }
    }
}

/// Raw registration input as received by an inbound adapter.
///
/// Every field may be missing; the validation rule set decides what is
/// acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    /// Requested username.
    #[serde(default)]
    pub username: Option<String>,
    /// Requested email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Requested age in years.
    #[serde(default)]
    pub age: Option<i64>,
}

impl RegistrationRequest {
    /// Build a fully populated request.
    pub fn new(username: impl Into<String>, email: impl Into<String>, age: i64) -> Self {
        Self {
            username: Some(username.into()),
            email: Some(email.into()),
            age: Some(age),
        }
    }
}

/// Persisted user record.
///
/// ## Invariants
/// - `username` and `email` are non-blank and unique among live records.
/// - `age` lies within the inclusive validation range.
/// - `id` and `created_at` are assigned by the store and never change.
///
/// Serialises as `{id, username, email, age, created_at}` with `created_at`
/// rendered as an RFC 3339 timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    email: String,
    age: u8,
    created_at: DateTime<Utc>,
}

impl User {
    /// Store-assigned identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Unique username.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Unique email address.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Age in years.
    pub fn age(&self) -> u8 {
        self.age
    }

    /// Insert timestamp assigned by the store.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
