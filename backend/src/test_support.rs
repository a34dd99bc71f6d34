//! Test utilities for the user registry crate.
//!
//! Integration suites drive the real application through the registration
//! form and then confirm every claim the form makes by re-querying the HTTP
//! API through an independent client. Compiled only with the `test-support`
//! feature.

mod oracle;
mod server;

pub use oracle::{BackendOracle, OracleError};
pub use server::{TestApp, spawn_app};
