//! # Database Error Types
//!
//! Error types for database operations, plus the failure taxonomy the
//! session manager reports.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  MySQL / SQLite error (sqlx::Error)     CoreError (binding, rules)     │
//! │       │                                      │                          │
//! │       └──────────────┬───────────────────────┘                          │
//! │                      ▼                                                  │
//! │  DbError (this module) ── kind() ──► Connectivity | Statement |         │
//! │       │                              Integrity                          │
//! │       ▼                                                                 │
//! │  Session: logged, returned as QueryResult::Failed (never raised)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Repository: DbResult<T>  ──►  view shows a message                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::time::Duration;

use ssms_core::{CoreError, ValidationError};
use thiserror::Error;

// =============================================================================
// Failure Kind
// =============================================================================

/// Coarse classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// No usable handle: unreachable host, rejected credentials, timeout,
    /// connection lost mid-query.
    Connectivity,
    /// The store rejected or could not run the statement: malformed SQL,
    /// unknown table, unbound parameter, undecodable result.
    Statement,
    /// A constraint rejected the data (unique, foreign key, not null, check).
    Integrity,
}

impl FailureKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Connectivity => "connectivity",
            FailureKind::Statement => "statement",
            FailureKind::Integrity => "integrity",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// DbError
// =============================================================================

/// Database operation errors.
///
/// `Clone` so a failed [`QueryResult`](crate::QueryResult) can be inspected
/// and passed on; driver errors are flattened to their messages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DbError {
    /// Opening a handle failed.
    ///
    /// ## When This Occurs
    /// - Host unreachable or refusing connections
    /// - Credentials rejected
    /// - SQLite file cannot be opened or created
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// MySQL configured without a password.
    ///
    /// No built-in fallback exists; set `DB_PASSWORD` or pass an override.
    #[error("No database password configured (set DB_PASSWORD)")]
    MissingCredentials,

    /// An operation exceeded its configured timeout.
    #[error("{phase} timed out after {after:?}")]
    Timeout { phase: &'static str, after: Duration },

    /// The connection dropped while a statement was running.
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate SKU, username, invoice number
    /// - Any UNIQUE index violation
    #[error("Duplicate value: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// NOT NULL or CHECK constraint violation.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// The store rejected the statement.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A result column could not be decoded into a [`Value`](ssms_core::Value).
    #[error("Decode failed: {0}")]
    Decode(String),

    /// Parameter binding, row mapping or a business rule failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Which bucket of the failure taxonomy this error falls in.
    pub fn kind(&self) -> FailureKind {
        match self {
            DbError::ConnectionFailed(_)
            | DbError::MissingCredentials
            | DbError::Timeout { .. }
            | DbError::ConnectionLost(_) => FailureKind::Connectivity,
            DbError::UniqueViolation(_)
            | DbError::ForeignKeyViolation(_)
            | DbError::ConstraintViolation(_) => FailureKind::Integrity,
            DbError::NotFound { .. }
            | DbError::QueryFailed(_)
            | DbError::Decode(_)
            | DbError::Core(_)
            | DbError::Internal(_) => FailureKind::Statement,
        }
    }

    /// Maps an error raised while opening a connection. Everything here is a
    /// connectivity failure, including MySQL's "Access denied".
    pub(crate) fn connect(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => DbError::ConnectionFailed(db_err.message().to_string()),
            other => DbError::ConnectionFailed(other.to_string()),
        }
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Core(CoreError::Validation(err))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database     → constraint kind (error code), then message text
/// sqlx::Error::Io/Protocol  → ConnectionLost
/// decode / column errors    → Decode
/// sqlx::Error::RowNotFound  → NotFound
/// Other                     → Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();
                match db_err.kind() {
                    sqlx::error::ErrorKind::UniqueViolation => DbError::UniqueViolation(msg),
                    sqlx::error::ErrorKind::ForeignKeyViolation => {
                        DbError::ForeignKeyViolation(msg)
                    }
                    sqlx::error::ErrorKind::NotNullViolation
                    | sqlx::error::ErrorKind::CheckViolation => DbError::ConstraintViolation(msg),
                    _ => classify_message(msg),
                }
            }

            sqlx::Error::Io(e) => DbError::ConnectionLost(e.to_string()),
            sqlx::Error::Protocol(msg) => DbError::ConnectionLost(msg),
            sqlx::Error::WorkerCrashed => {
                DbError::ConnectionLost("database worker thread stopped".to_string())
            }
            sqlx::Error::Tls(e) => DbError::ConnectionFailed(e.to_string()),
            sqlx::Error::Configuration(e) => DbError::ConnectionFailed(e.to_string()),
            e @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) => {
                DbError::ConnectionFailed(e.to_string())
            }

            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            e @ (sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::TypeNotFound { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }) => DbError::Decode(e.to_string()),

            other => DbError::Internal(other.to_string()),
        }
    }
}

/// Message-based fallback for drivers that don't report a constraint kind.
///
/// SQLite: `UNIQUE constraint failed: products.sku`,
/// `FOREIGN KEY constraint failed`, `NOT NULL constraint failed: ...`,
/// `CHECK constraint failed: ...`.
/// MySQL: `Duplicate entry 'LAP001' for key 'sku'`,
/// `Cannot add or update a child row: a foreign key constraint fails ...`.
fn classify_message(msg: String) -> DbError {
    if msg.contains("UNIQUE constraint failed") || msg.contains("Duplicate entry") {
        DbError::UniqueViolation(msg)
    } else if msg.contains("FOREIGN KEY constraint failed")
        || msg.contains("foreign key constraint fails")
    {
        DbError::ForeignKeyViolation(msg)
    } else if msg.contains("NOT NULL constraint failed")
        || msg.contains("CHECK constraint failed")
        || msg.contains("cannot be null")
    {
        DbError::ConstraintViolation(msg)
    } else {
        DbError::QueryFailed(msg)
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================
