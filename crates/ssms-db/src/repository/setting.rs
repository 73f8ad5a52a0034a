//! The `settings` table: typed key/value pairs.

use ssms_core::{params, Setting, SettingType};
use tracing::debug;

use crate::config::Backend;
use crate::connector::{Connector, SqlxConnector};
use crate::error::DbResult;
use crate::store::Store;

#[derive(Debug, Clone)]
pub struct SettingRepository<C: Connector + Clone = SqlxConnector> {
    store: Store<C>,
}

impl<C: Connector + Clone> SettingRepository<C> {
    pub fn new(store: Store<C>) -> Self {
        SettingRepository { store }
    }

    pub async fn get(&self, key: &str) -> DbResult<Option<Setting>> {
        self.store
            .query(
                "SELECT * FROM settings WHERE setting_key = ?",
                params![key],
            )
            .await
            .into_first()
    }

    /// Every setting, by key.
    pub async fn all(&self) -> DbResult<Vec<Setting>> {
        self.store
            .query("SELECT * FROM settings ORDER BY setting_key", ())
            .await
            .into_records()
    }

    /// Inserts or replaces a setting's value and type. The description of an
    /// existing setting is kept.
    pub async fn set(&self, key: &str, value: &str, setting_type: SettingType) -> DbResult<()> {
        debug!(key = %key, "Saving setting");
        let sql = match self.store.config().backend {
            Backend::Sqlite => {
                "INSERT INTO settings (setting_key, setting_value, setting_type) VALUES (?, ?, ?) \
                 ON CONFLICT(setting_key) DO UPDATE SET \
                 setting_value = excluded.setting_value, \
                 setting_type = excluded.setting_type, \
                 updated_at = CURRENT_TIMESTAMP"
            }
            Backend::MySql => {
                "INSERT INTO settings (setting_key, setting_value, setting_type) VALUES (?, ?, ?) \
                 ON DUPLICATE KEY UPDATE \
                 setting_value = VALUES(setting_value), \
                 setting_type = VALUES(setting_type)"
            }
        };
        self.store
            .query(sql, params![key, value, setting_type])
            .await
            .into_affected()
            .map(|_| ())
    }
}
