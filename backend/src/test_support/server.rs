//! Spawn the full application on an ephemeral port over a throwaway database.
//!
//! Actix spawns the server future with `spawn_local`, so callers must run
//! inside an Actix system (`#[actix_web::test]`) or a Tokio `LocalSet`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::web;
use reqwest::Url;
use tempfile::TempDir;

use super::oracle::BackendOracle;
use crate::inbound::http::health::HealthState;
use crate::outbound::persistence::DbConfig;
use crate::server::{ServerConfig, create_server};
use crate::ui::{HttpRegistrationApi, RegistrationForm};

const DATABASE_FILE: &str = "users.db";
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// A running application plus the temporary directory holding its database.
pub struct TestApp {
    base_url: Url,
    handle: ServerHandle,
    db_dir: TempDir,
}

/// Start the application on `127.0.0.1:0` with a fresh SQLite file.
///
/// # Errors
/// Returns [`std::io::Error`] when the temporary directory, the database or
/// the listener cannot be created.
pub async fn spawn_app() -> std::io::Result<TestApp> {
    start(tempfile::tempdir()?).await
}

async fn start(db_dir: TempDir) -> std::io::Result<TestApp> {
    let config = ServerConfig::new(
        SocketAddr::from(([127, 0, 0, 1], 0)),
        DbConfig::new(db_dir.path().join(DATABASE_FILE)),
    )
    .with_workers(1)
    .without_signals();

    let bound = create_server(web::Data::new(HealthState::new()), config).await?;
    let handle = bound.server.handle();
    actix_web::rt::spawn(bound.server);

    let base_url = Url::parse(&format!("http://{}/", bound.local_addr))
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(TestApp {
        base_url,
        handle,
        db_dir,
    })
}

impl TestApp {
    /// Root URL of the running server, with a trailing slash.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Location of the SQLite file backing this instance.
    pub fn database_path(&self) -> PathBuf {
        self.db_dir.path().join(DATABASE_FILE)
    }

    /// Temporary directory owning the database file.
    pub fn database_dir(&self) -> &Path {
        self.db_dir.path()
    }

    /// A fresh registration form wired to this server.
    ///
    /// # Errors
    /// Returns [`std::io::Error`] when the HTTP client cannot be built.
    pub fn form(&self) -> std::io::Result<RegistrationForm> {
        let api = HttpRegistrationApi::new(&self.base_url, CLIENT_TIMEOUT)
            .map_err(std::io::Error::other)?;
        Ok(RegistrationForm::new(Arc::new(api)))
    }

    /// An independent client for confirming what the store holds.
    ///
    /// # Errors
    /// Returns [`std::io::Error`] when the HTTP client cannot be built.
    pub fn oracle(&self) -> std::io::Result<BackendOracle> {
        BackendOracle::new(&self.base_url, CLIENT_TIMEOUT).map_err(std::io::Error::other)
    }

    /// Stop the server gracefully.
    pub async fn stop(&self) {
        self.handle.stop(true).await;
    }

    /// Stop the server and start a new one over the same database file.
    ///
    /// # Errors
    /// Returns [`std::io::Error`] when the new instance fails to start.
    pub async fn restart(self) -> std::io::Result<TestApp> {
        self.stop().await;
        start(self.db_dir).await
    }
}
