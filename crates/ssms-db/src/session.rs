//! # Session Manager
//!
//! Owns at most one live connection and runs one statement at a time on it.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Session::new(overrides)         config snapshot, no connection         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  execute_query(sql, params)                                             │
//! │       ├── Params::bind()         named → positional, classify           │
//! │       ├── acquire                reuse the live handle or open one      │
//! │       ├── run                    read → Rows, write → Affected          │
//! │       ├── release                ALWAYS, success or failure             │
//! │       └── QueryResult            Rows | Affected | Failed(DbError)      │
//! │                                                                         │
//! │  Errors never escape: they are logged with their FailureKind and        │
//! │  handed back inside the result.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use ssms_core::params;
//! use ssms_db::{DbConfig, Session};
//!
//! # async fn demo() {
//! let mut session = Session::from_config(DbConfig::sqlite("ssms.db"));
//! let result = session
//!     .execute_query("SELECT * FROM products WHERE sku = ?", params!["LAP001"])
//!     .await;
//!
//! match result.rows() {
//!     Some(rows) => println!("{} rows", rows.len()),
//!     None => println!("query failed: {:?}", result.error()),
//! }
//! assert!(!session.is_open());
//! # }
//! ```

use ssms_core::{FromRow, Params, Row, StatementKind};
use tracing::{debug, error, info};

use crate::config::{ConfigOverrides, DbConfig};
use crate::connector::{Connector, DbHandle, Outcome, SqlxConnector};
use crate::error::{DbError, DbResult, FailureKind};

// =============================================================================
// Query Result
// =============================================================================

/// Outcome of [`Session::execute_query`].
///
/// `rows()` / `affected()` give the plain "value or nothing" view;
/// `Failed` keeps the error and its kind for callers that need to tell
/// connectivity problems from bad statements.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// A read's rows, in store order.
    Rows(Vec<Row>),
    /// A write's affected-row count.
    Affected(u64),
    Failed(DbError),
}

impl QueryResult {
    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            QueryResult::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn affected(&self) -> Option<u64> {
        match self {
            QueryResult::Affected(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, QueryResult::Failed(_))
    }

    pub fn error(&self) -> Option<&DbError> {
        match self {
            QueryResult::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.error().map(DbError::kind)
    }

    pub fn into_rows(self) -> DbResult<Vec<Row>> {
        match self {
            QueryResult::Rows(rows) => Ok(rows),
            QueryResult::Affected(_) => Err(DbError::Internal(
                "expected a result set, statement returned a row count".to_string(),
            )),
            QueryResult::Failed(err) => Err(err),
        }
    }

    pub fn into_affected(self) -> DbResult<u64> {
        match self {
            QueryResult::Affected(n) => Ok(n),
            QueryResult::Rows(_) => Err(DbError::Internal(
                "expected a row count, statement returned a result set".to_string(),
            )),
            QueryResult::Failed(err) => Err(err),
        }
    }

    /// Maps every row through [`FromRow`].
    pub fn into_records<T: FromRow>(self) -> DbResult<Vec<T>> {
        self.into_rows()?
            .iter()
            .map(|row| T::from_row(row).map_err(DbError::from))
            .collect()
    }

    /// First row as a record, if any.
    pub fn into_first<T: FromRow>(self) -> DbResult<Option<T>> {
        match self.into_rows()?.first() {
            Some(row) => Ok(Some(T::from_row(row)?)),
            None => Ok(None),
        }
    }

    /// First column of the first row as an integer; `COUNT(*)`, `SUM(...)`.
    /// NULL and empty results count as zero.
    pub fn into_scalar(self) -> DbResult<i64> {
        let rows = self.into_rows()?;
        let Some((column, value)) = rows.first().and_then(|row| row.iter().next()) else {
            return Ok(0);
        };
        if value.is_null() {
            return Ok(0);
        }
        value
            .as_i64()
            .ok_or_else(|| ssms_core::CoreError::column_type(column, "an integer").into())
    }
}

// =============================================================================
// Session
// =============================================================================

/// A configuration plus at most one live handle.
///
/// Not shared between tasks: every method takes `&mut self`. Workers build
/// their own Session (it is `Send`).
pub struct Session<C: Connector = SqlxConnector> {
    config: DbConfig,
    connector: C,
    handle: Option<C::Handle>,
}

impl Session<SqlxConnector> {
    /// Environment configuration with `overrides` applied. Opens nothing.
    pub fn new(overrides: ConfigOverrides) -> Self {
        Self::from_config(DbConfig::from_env().merge(overrides))
    }

    pub fn from_config(config: DbConfig) -> Self {
        Session::with_connector(config, SqlxConnector)
    }

    /// Opens a connection with the environment configuration, runs
    /// `SELECT 1`, and closes it.
    pub async fn test_connection() -> bool {
        Session::test_connection_with(DbConfig::from_env(), SqlxConnector).await
    }
}

impl<C: Connector> Session<C> {
    pub fn with_connector(config: DbConfig, connector: C) -> Self {
        Session {
            config,
            connector,
            handle: None,
        }
    }

    /// [`Session::test_connection`] with an explicit configuration and
    /// connector.
    pub async fn test_connection_with(config: DbConfig, connector: C) -> bool {
        let mut session = Session::with_connector(config, connector);
        let ok = !session.execute_query("SELECT 1", Params::None).await.is_failure();
        debug!(ok, target = %session.config.target(), "Connection test");
        ok
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// Whether a live handle is held.
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Returns the live handle, opening one if needed.
    ///
    /// `None` when the connection cannot be opened; the failure is logged
    /// with its kind. Never panics.
    pub async fn acquire(&mut self) -> Option<&mut C::Handle> {
        self.open_handle().await.ok()
    }

    /// Closes the live handle, if any. Safe to call repeatedly; close
    /// failures are logged, not returned.
    ///
    /// The close is bounded by the write timeout. A handle that does not
    /// close in time (a link left half-dead by a timed-out statement) is
    /// dropped, which tears the socket down without the goodbye exchange.
    pub async fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            let limit = self.config.write_timeout;
            let closed = match tokio::time::timeout(limit, handle.close()).await {
                Ok(result) => result,
                Err(_) => Err(DbError::Timeout {
                    phase: "close",
                    after: limit,
                }),
            };
            if let Err(err) = closed {
                error!(kind = %err.kind(), error = %err, "Failed to close connection");
            }
        }
    }

    /// Runs one statement on a scoped connection.
    ///
    /// The handle is released before this returns, whatever happened. A
    /// handle the caller acquired beforehand is used and then released too.
    pub async fn execute_query(&mut self, sql: &str, params: impl Into<Params>) -> QueryResult {
        let result = self.run(sql, params.into()).await;
        self.release().await;

        match result {
            Ok(Outcome::Rows(rows)) => QueryResult::Rows(rows),
            Ok(Outcome::Affected(n)) => QueryResult::Affected(n),
            Err(err) => QueryResult::Failed(err),
        }
    }

    async fn run(&mut self, sql: &str, params: Params) -> DbResult<Outcome> {
        let bound = params.bind(sql).map_err(|err| {
            let err = DbError::from(err);
            error!(kind = %err.kind(), error = %err, "Query failed");
            err
        })?;
        let timeout = match bound.kind {
            StatementKind::Read => self.config.read_timeout,
            StatementKind::Write => self.config.write_timeout,
        };

        let handle = self.open_handle().await?;
        match handle.run(&bound.sql, &bound.values, bound.kind, timeout).await {
            Ok(outcome) => {
                match &outcome {
                    Outcome::Rows(rows) => {
                        debug!(kind = ?bound.kind, rows = rows.len(), "Statement executed")
                    }
                    Outcome::Affected(n) => {
                        debug!(kind = ?bound.kind, affected = n, "Statement executed")
                    }
                }
                Ok(outcome)
            }
            Err(err) => {
                error!(kind = %err.kind(), error = %err, "Query failed");
                Err(err)
            }
        }
    }

    async fn open_handle(&mut self) -> DbResult<&mut C::Handle> {
        if self.handle.is_none() {
            match self.connector.open(&self.config).await {
                Ok(handle) => {
                    info!(
                        backend = %self.config.backend,
                        target = %self.config.target(),
                        "Connection established"
                    );
                    self.handle = Some(handle);
                }
                Err(err) => {
                    error!(
                        kind = %err.kind(),
                        error = %err,
                        target = %self.config.target(),
                        "Connection failed"
                    );
                    return Err(err);
                }
            }
        }
        self.handle
            .as_mut()
            .ok_or_else(|| DbError::Internal("no live handle after open".to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ssms_core::{params, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Counts opens and closes; can fail the next open or every run.
    #[derive(Clone, Default)]
    struct CountingConnector {
        opens: Arc<AtomicUsize>,
        closes: Arc<AtomicUsize>,
        fail_run: bool,
        hang_close: bool,
        password: Option<String>,
    }

    struct CountingHandle {
        closes: Arc<AtomicUsize>,
        fail_run: bool,
        hang_close: bool,
    }

    impl CountingConnector {
        fn opens(&self) -> usize {
            self.opens.load(Ordering::SeqCst)
        }

        fn closes(&self) -> usize {
            self.closes.load(Ordering::SeqCst)
        }
    }

    impl Connector for CountingConnector {
        type Handle = CountingHandle;

        async fn open(&self, config: &DbConfig) -> DbResult<CountingHandle> {
            if let Some(expected) = &self.password {
                if config.password.as_ref() != Some(expected) {
                    return Err(DbError::ConnectionFailed(format!(
                        "Access denied for user '{}'",
                        config.user
                    )));
                }
            }
            self.opens.fetch_add(1, Ordering::SeqCst);
            Ok(CountingHandle {
                closes: self.closes.clone(),
                fail_run: self.fail_run,
                hang_close: self.hang_close,
            })
        }
    }

    impl DbHandle for CountingHandle {
        async fn run(
            &mut self,
            _sql: &str,
            values: &[Value],
            kind: StatementKind,
            _timeout: Duration,
        ) -> DbResult<Outcome> {
            if self.fail_run {
                return Err(DbError::ConnectionLost("injected fault".to_string()));
            }
            Ok(match kind {
                StatementKind::Read => Outcome::Rows(vec![Row::new().with("1", 1)]),
                StatementKind::Write => Outcome::Affected(values.len() as u64),
            })
        }

        async fn close(self) -> DbResult<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            if self.hang_close {
                std::future::pending::<()>().await;
            }
            Ok(())
        }
    }

    fn session(connector: &CountingConnector) -> Session<CountingConnector> {
        Session::with_connector(DbConfig::default().password("pw"), connector.clone())
    }

    #[tokio::test]
    async fn test_acquire_then_release_leaves_nothing_open() {
        let connector = CountingConnector::default();
        let mut session = session(&connector);

        assert!(session.acquire().await.is_some());
        assert!(session.is_open());
        session.release().await;

        assert!(!session.is_open());
        assert_eq!(connector.opens(), 1);
        assert_eq!(connector.closes(), 1);
    }

    #[tokio::test]
    async fn test_acquire_reuses_live_handle() {
        let connector = CountingConnector::default();
        let mut session = session(&connector);

        assert!(session.acquire().await.is_some());
        assert!(session.acquire().await.is_some());
        assert_eq!(connector.opens(), 1);

        session.release().await;
        session.release().await;
        assert_eq!(connector.closes(), 1);

        // after release the next acquire opens a new handle
        assert!(session.acquire().await.is_some());
        assert_eq!(connector.opens(), 2);
        session.release().await;
    }

    #[tokio::test]
    async fn test_execute_query_releases_after_read_and_write() {
        let connector = CountingConnector::default();
        let mut session = session(&connector);

        let read = session.execute_query("SELECT 1", ()).await;
        assert_eq!(read.rows().map(<[Row]>::len), Some(1));
        assert!(!session.is_open());

        let write = session
            .execute_query("UPDATE products SET stock_quantity = ? WHERE sku = ?", params![9, "LAP001"])
            .await;
        assert_eq!(write.affected(), Some(2));
        assert!(write.rows().is_none());

        assert_eq!(connector.opens(), 2);
        assert_eq!(connector.closes(), 2);
    }

    #[tokio::test]
    async fn test_execute_query_uses_and_releases_acquired_handle() {
        let connector = CountingConnector::default();
        let mut session = session(&connector);

        assert!(session.acquire().await.is_some());
        let result = session.execute_query("SELECT 1", ()).await;
        assert!(!result.is_failure());
        assert!(!session.is_open());
        assert_eq!(connector.opens(), 1);
        assert_eq!(connector.closes(), 1);
    }

    #[tokio::test]
    async fn test_fault_mid_query_releases_exactly_once() {
        let connector = CountingConnector {
            fail_run: true,
            ..CountingConnector::default()
        };
        let mut session = session(&connector);

        let result = session.execute_query("SELECT * FROM products", ()).await;
        assert!(result.is_failure());
        assert_eq!(result.rows(), None);
        assert_eq!(result.failure_kind(), Some(FailureKind::Connectivity));
        assert_eq!(connector.closes(), 1);
        assert!(!session.is_open());
    }

    #[tokio::test]
    async fn test_release_gives_up_on_a_hung_close() {
        let connector = CountingConnector {
            hang_close: true,
            ..CountingConnector::default()
        };
        let mut session = Session::with_connector(
            DbConfig::default()
                .password("pw")
                .write_timeout(Duration::from_millis(50)),
            connector.clone(),
        );

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            session.execute_query("SELECT 1", ()),
        )
        .await
        .expect("execute_query must not wait on a hung close");

        assert_eq!(result.rows().map(<[Row]>::len), Some(1));
        assert_eq!(connector.closes(), 1);
        assert!(!session.is_open());

        // the next operation opens a fresh handle
        assert!(session.acquire().await.is_some());
        assert_eq!(connector.opens(), 2);
    }

    #[tokio::test]
    async fn test_unbound_parameter_never_opens() {
        let connector = CountingConnector::default();
        let mut session = session(&connector);

        let result = session
            .execute_query(
                "SELECT * FROM products WHERE sku = :sku",
                ssms_core::Params::named([("code", "LAP001")]),
            )
            .await;
        assert_eq!(result.failure_kind(), Some(FailureKind::Statement));
        assert_eq!(connector.opens(), 0);
    }

    #[tokio::test]
    async fn test_wrong_password_acquire_returns_none() {
        let connector = CountingConnector {
            password: Some("right".to_string()),
            ..CountingConnector::default()
        };
        let mut session = Session::with_connector(
            DbConfig::default().password("wrong"),
            connector.clone(),
        );

        assert!(session.acquire().await.is_none());
        assert!(!session.is_open());

        let result = session.execute_query("SELECT 1", ()).await;
        assert_eq!(result.failure_kind(), Some(FailureKind::Connectivity));
        assert_eq!(connector.closes(), 0);
    }

    #[tokio::test]
    async fn test_connection_probe() {
        let good = CountingConnector::default();
        assert!(Session::test_connection_with(DbConfig::default().password("pw"), good.clone()).await);
        assert_eq!(good.closes(), 1);

        let bad = CountingConnector {
            password: Some("right".to_string()),
            ..CountingConnector::default()
        };
        assert!(!Session::test_connection_with(DbConfig::default(), bad).await);
    }

    #[test]
    fn test_query_result_accessors() {
        let rows = QueryResult::Rows(vec![Row::new().with("count", 5)]);
        assert_eq!(rows.clone().into_scalar().unwrap(), 5);
        assert!(rows.clone().into_affected().is_err());

        let empty = QueryResult::Rows(Vec::new());
        assert_eq!(empty.into_scalar().unwrap(), 0);

        let failed = QueryResult::Failed(DbError::MissingCredentials);
        assert_eq!(failed.affected(), None);
        assert_eq!(failed.clone().into_rows(), Err(DbError::MissingCredentials));
        assert_eq!(failed.failure_kind(), Some(FailureKind::Connectivity));
    }

    #[test]
    fn test_session_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Session>();
    }
}
