//! Server configuration loaded via OrthoConfig, plus the resolved server
//! configuration object.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::DbConfig;

const DEFAULT_BIND_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATABASE_PATH: &str = "users.db";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Settings controlling where the server listens and where users are stored.
///
/// Values layer defaults, configuration files, `USER_REGISTRY_*` environment
/// variables and command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USER_REGISTRY")]
pub struct ServerSettings {
    /// Interface to bind.
    pub bind_host: Option<String>,
    /// TCP port to bind.
    pub port: Option<u16>,
    /// SQLite database file.
    pub database_path: Option<PathBuf>,
    /// Milliseconds SQLite waits on a locked database file.
    pub busy_timeout_ms: Option<u64>,
}

impl ServerSettings {
    /// Return the configured host, falling back to loopback.
    pub fn bind_host(&self) -> &str {
        self.bind_host.as_deref().unwrap_or(DEFAULT_BIND_HOST)
    }

    /// Return the configured port, falling back to 3000.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Return the configured database path, falling back to `users.db`.
    pub fn database_path(&self) -> &Path {
        self.database_path
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_DATABASE_PATH))
    }

    /// Return the configured SQLite busy timeout.
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS))
    }

    /// Resolve the host and port into a socket address.
    ///
    /// # Errors
    /// Returns [`std::io::Error`] when the host does not resolve.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        (self.bind_host(), self.port())
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                std::io::Error::other(format!("bind host {} did not resolve", self.bind_host()))
            })
    }

    /// Build the database configuration described by these settings.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path()).with_busy_timeout(self.busy_timeout())
    }
}

/// Builder-style configuration for creating the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db: DbConfig,
    pub(crate) workers: Option<usize>,
    pub(crate) handle_signals: bool,
}

impl ServerConfig {
    /// Construct a server configuration for the given address and database.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db: DbConfig) -> Self {
        Self {
            bind_addr,
            db,
            workers: None,
            handle_signals: true,
        }
    }

    /// Resolve a configuration from loaded settings.
    ///
    /// # Errors
    /// Returns [`std::io::Error`] when the bind host does not resolve.
    pub fn from_settings(settings: &ServerSettings) -> std::io::Result<Self> {
        Ok(Self::new(settings.bind_addr()?, settings.db_config()))
    }

    /// Limit the number of Actix worker threads.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Leave process signal handling to the caller, as embedded servers must.
    #[must_use]
    pub fn without_signals(mut self) -> Self {
        self.handle_signals = false;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Return the database configuration.
    #[must_use]
    pub fn db_config(&self) -> &DbConfig {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_args(args: &[&str]) -> ServerSettings {
        let mut argv = vec![OsString::from("user-registry")];
        argv.extend(args.iter().map(OsString::from));
        ServerSettings::load_from_iter(argv).expect("config should load")
    }

    fn cleared_env() -> [(&'static str, Option<String>); 4] {
        [
            ("USER_REGISTRY_BIND_HOST", None),
            ("USER_REGISTRY_PORT", None),
            ("USER_REGISTRY_DATABASE_PATH", None),
            ("USER_REGISTRY_BUSY_TIMEOUT_MS", None),
        ]
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(cleared_env());

        let settings = load_from_args(&[]);
        assert_eq!(settings.bind_host(), DEFAULT_BIND_HOST);
        assert_eq!(settings.port(), DEFAULT_PORT);
        assert_eq!(settings.database_path(), Path::new(DEFAULT_DATABASE_PATH));
        assert_eq!(settings.busy_timeout(), Duration::from_secs(5));
        assert_eq!(
            settings.bind_addr().expect("loopback resolves"),
            SocketAddr::from(([127, 0, 0, 1], 3000))
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("USER_REGISTRY_BIND_HOST", Some("0.0.0.0".to_owned())),
            ("USER_REGISTRY_PORT", Some("8081".to_owned())),
            ("USER_REGISTRY_DATABASE_PATH", Some("/tmp/registry.db".to_owned())),
            ("USER_REGISTRY_BUSY_TIMEOUT_MS", Some("250".to_owned())),
        ]);

        let settings = load_from_args(&[]);
        assert_eq!(settings.bind_host(), "0.0.0.0");
        assert_eq!(settings.port(), 8081);
        assert_eq!(settings.database_path(), Path::new("/tmp/registry.db"));
        assert_eq!(settings.busy_timeout(), Duration::from_millis(250));
    }

    #[rstest]
    fn cli_flags_override_environment() {
        let _guard = lock_env([
            ("USER_REGISTRY_BIND_HOST", None),
            ("USER_REGISTRY_PORT", Some("8081".to_owned())),
            ("USER_REGISTRY_DATABASE_PATH", None),
            ("USER_REGISTRY_BUSY_TIMEOUT_MS", None),
        ]);

        let settings = load_from_args(&["--port", "9090"]);
        assert_eq!(settings.port(), 9090);
    }

    #[rstest]
    fn server_config_builders_apply() {
        let config = ServerConfig::new(
            SocketAddr::from(([127, 0, 0, 1], 0)),
            DbConfig::new("users.db"),
        )
        .with_workers(1)
        .without_signals();

        assert_eq!(config.workers, Some(1));
        assert!(!config.handle_signals);
        assert_eq!(config.db_config().path(), Path::new("users.db"));
    }
}
