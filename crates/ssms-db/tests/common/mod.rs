//! Shared fixtures: seeded SQLite stores in scratch directories.

#![allow(dead_code)]

use ssms_db::{DbConfig, Store};
use tempfile::TempDir;

pub const ADMIN_PASSWORD: &str = "admin-secret";

/// Config for a fresh SQLite file inside `dir`.
pub fn sqlite_config(dir: &TempDir) -> DbConfig {
    DbConfig::sqlite(dir.path().join("ssms.db"))
}

/// A store whose schema and starter data are in place.
pub async fn seeded_store(dir: &TempDir) -> Store {
    let store = Store::new(sqlite_config(dir));
    store
        .bootstrap(Some(ADMIN_PASSWORD))
        .await
        .expect("bootstrap fresh SQLite file");
    store
}
