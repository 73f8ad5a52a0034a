//! Audit trail. Before/after snapshots are stored as JSON text.

use ssms_core::{params, AuditLogEntry, NewAuditEntry};
use tracing::debug;

use crate::connector::{Connector, SqlxConnector};
use crate::error::{DbError, DbResult};
use crate::store::Store;

#[derive(Debug, Clone)]
pub struct AuditRepository<C: Connector + Clone = SqlxConnector> {
    store: Store<C>,
}

impl<C: Connector + Clone> AuditRepository<C> {
    pub fn new(store: Store<C>) -> Self {
        AuditRepository { store }
    }

    pub async fn record(&self, entry: &NewAuditEntry) -> DbResult<()> {
        debug!(action = %entry.action, table = ?entry.table_name, "Recording audit entry");
        let old_values = entry.old_values.as_ref().map(to_json).transpose()?;
        let new_values = entry.new_values.as_ref().map(to_json).transpose()?;

        self.store
            .query(
                "INSERT INTO audit_log (user_id, action, table_name, record_id, old_values, \
                 new_values) VALUES (?, ?, ?, ?, ?, ?)",
                params![
                    entry.user_id,
                    entry.action.as_str(),
                    entry.table_name.as_deref(),
                    entry.record_id,
                    old_values,
                    new_values
                ],
            )
            .await
            .into_affected()
            .map(|_| ())
    }

    /// Latest entries, newest first.
    pub async fn recent(&self, limit: i64) -> DbResult<Vec<AuditLogEntry>> {
        self.store
            .query(
                "SELECT * FROM audit_log ORDER BY id DESC LIMIT ?",
                params![limit],
            )
            .await
            .into_records()
    }
}

fn to_json(value: &serde_json::Value) -> DbResult<String> {
    serde_json::to_string(value)
        .map_err(|e| DbError::Internal(format!("Failed to serialize audit values: {}", e)))
}
