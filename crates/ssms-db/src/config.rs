//! # Configuration Provider
//!
//! Connection parameters for the backing store, read from the environment.
//!
//! ## Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Variable      Default       Notes                                      │
//! │  ───────────   ───────────   ─────────────────────────────────────────  │
//! │  DB_BACKEND    mysql         "mysql" or "sqlite"                        │
//! │  DB_HOST       localhost                                                │
//! │  DB_PORT       3306          MySQL only                                 │
//! │  DB_USER       root                                                     │
//! │  DB_PASSWORD   (none)        required for MySQL                         │
//! │  DB_NAME       ssms_db       database name, or file path for SQLite     │
//! │                                                                         │
//! │  charset utf8mb4 • connect 10s • read 30s • write 30s                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every call to [`DbConfig::from_env`] builds a new value, so nothing a
//! caller does to its copy leaks into another caller's.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const ENV_BACKEND: &str = "DB_BACKEND";
pub const ENV_HOST: &str = "DB_HOST";
pub const ENV_PORT: &str = "DB_PORT";
pub const ENV_USER: &str = "DB_USER";
pub const ENV_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_NAME: &str = "DB_NAME";

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_USER: &str = "root";
const DEFAULT_DATABASE: &str = "ssms_db";
const DEFAULT_CHARSET: &str = "utf8mb4";
const MYSQL_PORT: u16 = 3306;

// =============================================================================
// Backend
// =============================================================================

/// Which store the session manager talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Networked MySQL / MariaDB server.
    #[default]
    MySql,
    /// Local SQLite file; `database` is the file path.
    Sqlite,
}

impl Backend {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Backend::MySql => "mysql",
            Backend::Sqlite => "sqlite",
        }
    }

    pub const fn default_port(&self) -> Option<u16> {
        match self {
            Backend::MySql => Some(MYSQL_PORT),
            Backend::Sqlite => None,
        }
    }

    /// `INSERT` that skips rows colliding with a unique key.
    pub const fn insert_ignore(&self) -> &'static str {
        match self {
            Backend::MySql => "INSERT IGNORE",
            Backend::Sqlite => "INSERT OR IGNORE",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Backend::MySql),
            "sqlite" | "sqlite3" => Ok(Backend::Sqlite),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

// =============================================================================
// DbConfig
// =============================================================================

/// A snapshot of connection parameters.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use ssms_db::{Backend, DbConfig};
///
/// let config = DbConfig::default()
///     .host("db.internal")
///     .password("s3cret")
///     .connect_timeout(Duration::from_secs(3));
///
/// assert_eq!(config.backend, Backend::MySql);
/// assert_eq!(config.effective_port(), Some(3306));
/// assert!(!format!("{:?}", config).contains("s3cret"));
/// ```
#[derive(Clone, PartialEq)]
pub struct DbConfig {
    pub backend: Backend,
    pub host: String,
    /// `None` means the backend's default.
    pub port: Option<u16>,
    pub user: String,
    /// No default: MySQL without a password refuses to connect.
    pub password: Option<String>,
    /// Database name (MySQL) or file path (SQLite).
    pub database: String,
    pub charset: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig {
            backend: Backend::MySql,
            host: DEFAULT_HOST.to_string(),
            port: None,
            user: DEFAULT_USER.to_string(),
            password: None,
            database: DEFAULT_DATABASE.to_string(),
            charset: DEFAULT_CHARSET.to_string(),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(30),
            write_timeout: Duration::from_secs(30),
        }
    }
}

/// Password is redacted.
impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("backend", &self.backend)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("charset", &self.charset)
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("write_timeout", &self.write_timeout)
            .finish()
    }
}

impl DbConfig {
    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same rules as [`DbConfig::from_env`] over any key lookup.
    ///
    /// Unparseable values are logged and replaced by their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = DbConfig::default();

        if let Some(raw) = get(ENV_BACKEND) {
            match raw.parse() {
                Ok(backend) => config.backend = backend,
                Err(reason) => warn!(var = ENV_BACKEND, %reason, "Ignoring invalid value"),
            }
        }
        if let Some(host) = get(ENV_HOST) {
            config.host = host;
        }
        if let Some(raw) = get(ENV_PORT) {
            match raw.trim().parse::<u16>() {
                Ok(port) if port > 0 => config.port = Some(port),
                _ => warn!(var = ENV_PORT, value = %raw, "Ignoring invalid port"),
            }
        }
        if let Some(user) = get(ENV_USER) {
            config.user = user;
        }
        // An empty DB_PASSWORD is still "set"
        config.password = lookup(ENV_PASSWORD);
        if let Some(database) = get(ENV_NAME) {
            config.database = database;
        }

        config
    }

    /// A SQLite file database.
    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            backend: Backend::Sqlite,
            database: path.into().to_string_lossy().into_owned(),
            ..DbConfig::default()
        }
    }

    /// Applies every field the overrides set.
    pub fn merge(mut self, overrides: ConfigOverrides) -> Self {
        let ConfigOverrides {
            backend,
            host,
            port,
            user,
            password,
            database,
            charset,
            connect_timeout,
            read_timeout,
            write_timeout,
        } = overrides;

        if let Some(v) = backend {
            self.backend = v;
        }
        if let Some(v) = host {
            self.host = v;
        }
        if port.is_some() {
            self.port = port;
        }
        if let Some(v) = user {
            self.user = v;
        }
        if password.is_some() {
            self.password = password;
        }
        if let Some(v) = database {
            self.database = v;
        }
        if let Some(v) = charset {
            self.charset = v;
        }
        if let Some(v) = connect_timeout {
            self.connect_timeout = v;
        }
        if let Some(v) = read_timeout {
            self.read_timeout = v;
        }
        if let Some(v) = write_timeout {
            self.write_timeout = v;
        }
        self
    }

    pub fn effective_port(&self) -> Option<u16> {
        self.port.or_else(|| self.backend.default_port())
    }

    /// `host:port/database` or the SQLite path, for log lines.
    pub fn target(&self) -> String {
        match self.backend {
            Backend::MySql => format!(
                "{}:{}/{}",
                self.host,
                self.effective_port().unwrap_or(MYSQL_PORT),
                self.database
            ),
            Backend::Sqlite => self.database.clone(),
        }
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

// =============================================================================
// Overrides
// =============================================================================

/// Optional per-session changes to the environment configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub backend: Option<Backend>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub charset: Option<String>,
    pub connect_timeout: Option<Duration>,
    pub read_timeout: Option<Duration>,
    pub write_timeout: Option<Duration>,
}

impl ConfigOverrides {
    pub fn none() -> Self {
        ConfigOverrides::default()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DbConfig::from_lookup(|_| None);
        assert_eq!(config.backend, Backend::MySql);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.effective_port(), Some(3306));
        assert_eq!(config.user, "root");
        assert_eq!(config.password, None);
        assert_eq!(config.database, "ssms_db");
        assert_eq!(config.charset, "utf8mb4");
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.read_timeout, Duration::from_secs(30));
        assert_eq!(config.write_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_environment_values() {
        let config = DbConfig::from_lookup(lookup(&[
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "3307"),
            ("DB_USER", "ssms"),
            ("DB_PASSWORD", "pw"),
            ("DB_NAME", "shop"),
        ]));
        assert_eq!(config.target(), "db.internal:3307/shop");
        assert_eq!(config.user, "ssms");
        assert_eq!(config.password.as_deref(), Some("pw"));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = DbConfig::from_lookup(lookup(&[
            ("DB_BACKEND", "oracle"),
            ("DB_PORT", "not-a-port"),
        ]));
        assert_eq!(config.backend, Backend::MySql);
        assert_eq!(config.port, None);

        let config = DbConfig::from_lookup(lookup(&[("DB_PORT", "0")]));
        assert_eq!(config.port, None);
    }

    #[test]
    fn test_sqlite_backend() {
        let config = DbConfig::from_lookup(lookup(&[
            ("DB_BACKEND", "SQLite"),
            ("DB_NAME", "/tmp/ssms.db"),
        ]));
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.effective_port(), None);
        assert_eq!(config.target(), "/tmp/ssms.db");
        assert_eq!(DbConfig::sqlite("/tmp/ssms.db").database, "/tmp/ssms.db");
    }

    #[test]
    fn test_snapshots_are_independent() {
        let mut first = DbConfig::from_lookup(|_| None);
        first.host = "changed".to_string();
        let second = DbConfig::from_lookup(|_| None);
        assert_eq!(second.host, "localhost");
    }

    #[test]
    fn test_merge_overrides() {
        let merged = DbConfig::default().password("env").merge(ConfigOverrides {
            host: Some("override".to_string()),
            port: Some(3310),
            read_timeout: Some(Duration::from_secs(5)),
            ..ConfigOverrides::none()
        });
        assert_eq!(merged.host, "override");
        assert_eq!(merged.port, Some(3310));
        assert_eq!(merged.read_timeout, Duration::from_secs(5));
        // untouched fields keep their values
        assert_eq!(merged.password.as_deref(), Some("env"));
        assert_eq!(merged.user, "root");
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = DbConfig::default().password("hunter2");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
