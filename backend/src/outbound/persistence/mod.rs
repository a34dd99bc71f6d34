//! SQLite persistence adapters using Diesel ORM.
//!
//! This module provides the concrete [`crate::domain::ports::UserStore`]
//! implementation backed by an embedded SQLite file, driven through Diesel
//! with async support from `diesel-async`'s sync connection wrapper.
//!
//! # Architecture
//!
//! - **Thin adapters**: the store only translates between Diesel rows and
//!   domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: database errors are mapped to
//!   [`crate::domain::ports::UserStoreError`] variants.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use mockable::DefaultClock;
//! use user_registry::outbound::persistence::{Database, DbConfig, DieselUserStore};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::open(DbConfig::new("users.db")).await?;
//! let store = DieselUserStore::new(db, Arc::new(DefaultClock));
//! # drop(store);
//! # Ok(())
//! # }
//! ```

mod database;
mod diesel_user_store;
mod models;
mod schema;

pub use database::{Database, DbConfig, DbError, SqliteAsyncConnection};
pub use diesel_user_store::DieselUserStore;
