//! Embedded SQLite database handle for Diesel.
//!
//! This module wraps `diesel-async`'s [`SyncConnectionWrapper`] around a
//! single [`SqliteConnection`]. The connection sits behind an async mutex, so
//! the store serialises every statement and the uniqueness invariant holds
//! even when requests arrive concurrently.
//!
//! # Design
//!
//! - The database file and its schema are created on first open; there is no
//!   migration system.
//! - WAL journaling with `synchronous = FULL` makes each autocommitted write
//!   durable before the statement returns.
//! - Blocking SQLite calls run on Tokio's blocking pool via the wrapper.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use diesel::sqlite::SqliteConnection;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::{AsyncConnection, SimpleAsyncConnection};
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

/// Async-capable SQLite connection used by the persistence adapters.
pub type SqliteAsyncConnection = SyncConnectionWrapper<SqliteConnection>;

const CREATE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    age INTEGER NOT NULL,
    created_at TIMESTAMP NOT NULL
);
";

/// Errors that can occur while opening the database.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DbError {
    /// The database file could not be opened or created.
    #[error("failed to open database: {message}")]
    Open { message: String },

    /// Connection settings or schema creation failed.
    #[error("failed to prepare database schema: {message}")]
    Schema { message: String },
}

impl DbError {
    /// Create an open error with the given message.
    pub fn open(message: impl Into<String>) -> Self {
        Self::Open {
            message: message.into(),
        }
    }

    /// Create a schema error with the given message.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }
}

/// Configuration for the embedded database.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use user_registry::outbound::persistence::DbConfig;
///
/// let config = DbConfig::new("users.db").with_busy_timeout(Duration::from_secs(2));
/// assert_eq!(config.path().to_str(), Some("users.db"));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    path: PathBuf,
    busy_timeout: Duration,
}

impl DbConfig {
    /// Create a new configuration for the database file at `path`.
    ///
    /// `busy_timeout` defaults to 5 seconds.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: Duration::from_secs(5),
        }
    }

    /// Set how long SQLite waits on a locked database file.
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Get the database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn pragmas(&self) -> String {
        format!(
            "PRAGMA busy_timeout = {}; PRAGMA journal_mode = WAL; PRAGMA synchronous = FULL;",
            self.busy_timeout.as_millis()
        )
    }
}

/// Shared handle to the single SQLite connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<SqliteAsyncConnection>>,
    path: PathBuf,
}

impl Database {
    /// Open the database file, creating it and the schema if missing.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Open`] if the file cannot be opened and
    /// [`DbError::Schema`] if the pragmas or DDL fail.
    pub async fn open(config: DbConfig) -> Result<Self, DbError> {
        if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| DbError::open(err.to_string()))?;
        }
        let url = config
            .path
            .to_str()
            .ok_or_else(|| DbError::open("database path is not valid UTF-8"))?;

        let mut conn = SqliteAsyncConnection::establish(url)
            .await
            .map_err(|err| DbError::open(err.to_string()))?;
        conn.batch_execute(&config.pragmas())
            .await
            .map_err(|err| DbError::schema(err.to_string()))?;
        conn.batch_execute(CREATE_SCHEMA)
            .await
            .map_err(|err| DbError::schema(err.to_string()))?;

        info!(path = %config.path.display(), "database ready");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: config.path,
        })
    }

    /// Wait for exclusive use of the connection.
    pub async fn connection(&self) -> MutexGuard<'_, SqliteAsyncConnection> {
        self.conn.lock().await
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn db_config_defaults() {
        let config = DbConfig::new("data/users.db");

        assert_eq!(config.path(), Path::new("data/users.db"));
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
    }

    #[rstest]
    fn pragmas_enable_durable_writes() {
        let pragmas = DbConfig::new("users.db")
            .with_busy_timeout(Duration::from_millis(250))
            .pragmas();

        assert!(pragmas.contains("busy_timeout = 250"));
        assert!(pragmas.contains("journal_mode = WAL"));
        assert!(pragmas.contains("synchronous = FULL"));
    }

    #[rstest]
    fn db_error_display() {
        assert!(DbError::open("permission denied").to_string().contains("permission denied"));
        assert!(DbError::schema("syntax error").to_string().contains("syntax error"));
    }

    #[rstest]
    #[tokio::test]
    async fn open_creates_file_and_nested_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("users.db");

        let db = Database::open(DbConfig::new(&path)).await.expect("database opens");

        assert!(path.exists());
        assert_eq!(db.path(), path.as_path());
    }

    #[rstest]
    #[tokio::test]
    async fn reopening_keeps_existing_schema() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("users.db");

        drop(Database::open(DbConfig::new(&path)).await.expect("first open"));
        Database::open(DbConfig::new(&path)).await.expect("second open");
    }
}
