//! # Settings File
//!
//! The preferences JSON the settings view edits (`settings.json`).
//!
//! ```text
//! load():  defaults ← overlay ← file object      (missing/bad file → defaults)
//! save():  map − db_password → pretty JSON → <file>.tmp → rename over <file>
//! ```
//!
//! The database password is never written to disk; it comes from
//! `DB_PASSWORD` or an explicit override only.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value as JsonValue};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ConfigOverrides;

/// Key/value settings as stored in the file.
pub type SettingsMap = Map<String, JsonValue>;

/// Keys dropped before saving.
const SECRET_KEYS: &[&str] = &["db_password"];

#[derive(Debug, Error)]
pub enum SettingsFileError {
    #[error("Failed to write settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Settings persisted at one path.
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SettingsFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Built-in defaults.
    pub fn defaults() -> SettingsMap {
        let defaults = json!({
            "company_name": "",
            "company_address": "",
            "company_phone": "",
            "company_email": "",
            "currency": "₹ (INR)",
            "timezone": "Asia/Kolkata",
            "date_format": "DD/MM/YYYY",
            "db_host": "localhost",
            "db_port": 3306,
            "db_name": "ssms_db",
            "db_user": "root",
            "theme": "Dark",
            "accent_color": "Blue",
            "font_size": 14,
            "auto_refresh": true,
            "show_tooltips": true,
            "start_maximized": false,
            "remember_position": true,
            "password_min_length": 8,
            "require_special_chars": true,
            "password_expiry_days": 90,
            "session_timeout": 30,
            "auto_logout": true,
            "enable_audit_log": true,
            "log_retention_days": 365,
            "backup_frequency": "Daily",
            "backup_location": "./backups",
            "auto_backup": true,
            "compress_backups": true
        });
        match defaults {
            JsonValue::Object(map) => map,
            _ => SettingsMap::new(),
        }
    }

    /// Defaults overlaid with the file's keys. A missing, unreadable or
    /// malformed file gives the defaults; problems are logged.
    pub fn load(&self) -> SettingsMap {
        let mut settings = Self::defaults();

        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No settings file, using defaults");
                return settings;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read settings file");
                return settings;
            }
        };

        match serde_json::from_str::<JsonValue>(&text) {
            Ok(JsonValue::Object(stored)) => settings.extend(stored),
            Ok(_) => {
                warn!(path = %self.path.display(), "Settings file is not a JSON object, ignoring")
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to parse settings file")
            }
        }
        settings
    }

    /// Writes the settings through a temporary file, so a crash mid-write
    /// leaves the previous file intact.
    pub fn save(&self, settings: &SettingsMap) -> Result<(), SettingsFileError> {
        let mut persisted = settings.clone();
        for key in SECRET_KEYS {
            persisted.remove(*key);
        }
        let text = serde_json::to_string_pretty(&persisted)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text).map_err(|source| SettingsFileError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| SettingsFileError::Io {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), keys = persisted.len(), "Settings saved");
        Ok(())
    }
}

/// Connection fields from the settings (`db_host`, `db_port`, `db_name`,
/// `db_user`) as overrides for a Session. Blank or mistyped values are
/// skipped.
pub fn connection_overrides(settings: &SettingsMap) -> ConfigOverrides {
    let text = |key: &str| {
        settings
            .get(key)
            .and_then(JsonValue::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    ConfigOverrides {
        host: text("db_host"),
        port: settings
            .get("db_port")
            .and_then(JsonValue::as_u64)
            .and_then(|port| u16::try_from(port).ok()),
        database: text("db_name"),
        user: text("db_user"),
        ..ConfigOverrides::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let file = SettingsFile::new(dir.path().join("settings.json"));
        let settings = file.load();
        assert_eq!(settings, SettingsFile::defaults());
        assert_eq!(settings["timezone"], "Asia/Kolkata");
    }

    #[test]
    fn test_save_then_load_overlays_defaults() {
        let dir = TempDir::new().unwrap();
        let file = SettingsFile::new(dir.path().join("settings.json"));

        let mut settings = SettingsMap::new();
        settings.insert("company_name".into(), json!("SSMS Solutions"));
        settings.insert("font_size".into(), json!(16));
        file.save(&settings).unwrap();

        let loaded = file.load();
        assert_eq!(loaded["company_name"], "SSMS Solutions");
        assert_eq!(loaded["font_size"], 16);
        assert_eq!(loaded["theme"], "Dark");
        assert!(!dir.path().join("settings.json.tmp").exists());
    }

    #[test]
    fn test_password_never_persisted() {
        let dir = TempDir::new().unwrap();
        let file = SettingsFile::new(dir.path().join("settings.json"));

        let mut settings = SettingsFile::defaults();
        settings.insert("db_password".into(), json!("hunter2"));
        file.save(&settings).unwrap();

        let text = fs::read_to_string(file.path()).unwrap();
        assert!(!text.contains("hunter2"));
        assert!(!file.load().contains_key("db_password"));
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(SettingsFile::new(path).load(), SettingsFile::defaults());
    }

    #[test]
    fn test_connection_overrides() {
        let mut settings = SettingsFile::defaults();
        settings.insert("db_host".into(), json!("db.internal"));
        settings.insert("db_port".into(), json!(3307));
        settings.insert("db_user".into(), json!("  "));

        let overrides = connection_overrides(&settings);
        assert_eq!(overrides.host.as_deref(), Some("db.internal"));
        assert_eq!(overrides.port, Some(3307));
        assert_eq!(overrides.database.as_deref(), Some("ssms_db"));
        assert_eq!(overrides.user, None);
        assert_eq!(overrides.password, None);
    }
}
