//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod form;
pub mod health;
pub mod schemas;
pub mod state;
pub mod users;

pub use error::ApiResult;
