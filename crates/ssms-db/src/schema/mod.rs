//! # Schema Bootstrapper
//!
//! Creates the tables and loads the starter data.
//!
//! ## Steps
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. connect        SELECT 1 on a fresh Session                          │
//! │  2. create tables  CREATE TABLE IF NOT EXISTS, fixed order (tables.rs)  │
//! │  3. seed           INSERT OR IGNORE / INSERT IGNORE, fixed order        │
//! │                                                                         │
//! │  Every statement runs on its own Session (acquire → run → release).     │
//! │  The first failure stops the run and names its step. Steps already      │
//! │  applied stay applied; running again is safe.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod seed;
mod tables;

pub use seed::{seed_statements, SeedStatement, ADMIN_USERNAME};
pub use tables::{TableDef, TABLES};

use ssms_core::Params;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::DbConfig;
use crate::connector::{Connector, SqlxConnector};
use crate::error::DbError;
use crate::password::hash_password;
use crate::session::{QueryResult, Session};

/// The first step that failed, and why.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Schema setup failed at '{step}': {source}")]
pub struct BootstrapError {
    pub step: String,
    #[source]
    pub source: DbError,
}

impl BootstrapError {
    fn at(step: impl Into<String>, source: DbError) -> Self {
        BootstrapError {
            step: step.into(),
            source,
        }
    }
}

/// What a successful run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Table statements executed.
    pub tables: usize,
    /// Seed statements executed.
    pub seed_statements: usize,
    /// Rows the seeds actually inserted; 0 on a re-run.
    pub rows_inserted: u64,
}

/// Creates the schema and seeds it.
///
/// ## Usage
/// ```rust,no_run
/// use ssms_db::{DbConfig, SchemaBootstrapper};
///
/// # async fn demo() {
/// let report = SchemaBootstrapper::new(DbConfig::sqlite("ssms.db"))
///     .admin_password("change-me")
///     .run()
///     .await
///     .expect("schema setup");
/// println!("{} tables, {} rows", report.tables, report.rows_inserted);
/// # }
/// ```
pub struct SchemaBootstrapper<C: Connector + Clone = SqlxConnector> {
    config: DbConfig,
    connector: C,
    admin_password: Option<String>,
}

impl SchemaBootstrapper<SqlxConnector> {
    pub fn new(config: DbConfig) -> Self {
        SchemaBootstrapper::with_connector(config, SqlxConnector)
    }
}

impl<C: Connector + Clone> SchemaBootstrapper<C> {
    pub fn with_connector(config: DbConfig, connector: C) -> Self {
        SchemaBootstrapper {
            config,
            connector,
            admin_password: None,
        }
    }

    /// Seeds an `admin` user with this password (stored hashed). Without
    /// it no user is seeded.
    pub fn admin_password(mut self, password: impl Into<String>) -> Self {
        self.admin_password = Some(password.into());
        self
    }

    /// Runs every step in order, stopping at the first failure.
    pub async fn run(&self) -> Result<BootstrapReport, BootstrapError> {
        let backend = self.config.backend;
        info!(backend = %backend, target = %self.config.target(), "Bootstrapping schema");

        self.execute("connect", "SELECT 1", Params::None).await?;

        let mut report = BootstrapReport::default();
        for table in TABLES {
            let step = format!("create table {}", table.name);
            self.execute(&step, table.create_sql(backend), Params::None)
                .await?;
            report.tables += 1;
        }
        debug!(tables = report.tables, "Tables ready");

        let admin_hash = match &self.admin_password {
            Some(password) => Some(
                hash_password(password)
                    .await
                    .map_err(|err| BootstrapError::at("hash admin password", err))?,
            ),
            None => None,
        };

        for stmt in seed_statements(backend, admin_hash.as_deref()) {
            let result = self.execute(&stmt.step, &stmt.sql, stmt.params).await?;
            report.seed_statements += 1;
            report.rows_inserted += result.affected().unwrap_or(0);
        }

        info!(
            tables = report.tables,
            seed_statements = report.seed_statements,
            rows_inserted = report.rows_inserted,
            "Schema bootstrap complete"
        );
        Ok(report)
    }

    async fn execute(
        &self,
        step: &str,
        sql: &str,
        params: Params,
    ) -> Result<QueryResult, BootstrapError> {
        let mut session = Session::with_connector(self.config.clone(), self.connector.clone());
        let result = session.execute_query(sql, params).await;
        match result {
            QueryResult::Failed(err) => {
                error!(step, kind = %err.kind(), error = %err, "Bootstrap step failed");
                Err(BootstrapError::at(step, err))
            }
            ok => Ok(ok),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Backend;
    use crate::connector::{DbHandle, Outcome};
    use crate::error::DbResult;
    use ssms_core::{StatementKind, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Numbers every statement run across all handles and rejects the one
    /// at `fail_at` (0-based; `connect` is 0).
    #[derive(Clone)]
    struct FailingConnector {
        fail_at: usize,
        runs: Arc<AtomicUsize>,
        opens: Arc<AtomicUsize>,
        closes: Arc<AtomicUsize>,
    }

    impl FailingConnector {
        fn new(fail_at: usize) -> Self {
            FailingConnector {
                fail_at,
                runs: Arc::default(),
                opens: Arc::default(),
                closes: Arc::default(),
            }
        }

        fn count(counter: &Arc<AtomicUsize>) -> usize {
            counter.load(Ordering::SeqCst)
        }
    }

    struct FailingHandle {
        connector: FailingConnector,
    }

    impl Connector for FailingConnector {
        type Handle = FailingHandle;

        async fn open(&self, _config: &DbConfig) -> DbResult<FailingHandle> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            Ok(FailingHandle {
                connector: self.clone(),
            })
        }
    }

    impl DbHandle for FailingHandle {
        async fn run(
            &mut self,
            _sql: &str,
            _values: &[Value],
            kind: StatementKind,
            _timeout: Duration,
        ) -> DbResult<Outcome> {
            let n = self.connector.runs.fetch_add(1, Ordering::SeqCst);
            if n == self.connector.fail_at {
                return Err(DbError::QueryFailed("disk I/O error".to_string()));
            }
            Ok(match kind {
                StatementKind::Read => Outcome::Rows(Vec::new()),
                StatementKind::Write => Outcome::Affected(1),
            })
        }

        async fn close(self) -> DbResult<()> {
            self.connector.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn bootstrapper(connector: &FailingConnector) -> SchemaBootstrapper<FailingConnector> {
        SchemaBootstrapper::with_connector(DbConfig::sqlite("unused.db"), connector.clone())
    }

    #[tokio::test]
    async fn test_failed_table_stops_the_run() {
        let products = TABLES
            .iter()
            .position(|table| table.name == "products")
            .unwrap();
        // connect, then every table up to and including products
        let connector = FailingConnector::new(1 + products);

        let err = bootstrapper(&connector).run().await.unwrap_err();

        assert_eq!(err.step, "create table products");
        assert_eq!(err.source.kind(), crate::FailureKind::Statement);
        assert_eq!(FailingConnector::count(&connector.runs), products + 2);
        assert_eq!(FailingConnector::count(&connector.opens), products + 2);
        assert_eq!(FailingConnector::count(&connector.closes), products + 2);
    }

    #[tokio::test]
    async fn test_failed_seed_names_its_statement() {
        let seeds = seed_statements(Backend::Sqlite, None);
        let laptop = seeds
            .iter()
            .position(|stmt| stmt.step == "seed product LAP001")
            .unwrap();
        let connector = FailingConnector::new(1 + TABLES.len() + laptop);

        let err = bootstrapper(&connector).run().await.unwrap_err();

        assert_eq!(err.step, "seed product LAP001");
        assert_eq!(
            err.to_string(),
            "Schema setup failed at 'seed product LAP001': Query failed: disk I/O error"
        );
        let ran = 1 + TABLES.len() + laptop + 1;
        assert!(ran < 1 + TABLES.len() + seeds.len());
        assert_eq!(FailingConnector::count(&connector.runs), ran);
        assert_eq!(FailingConnector::count(&connector.closes), ran);
    }

    #[tokio::test]
    async fn test_unopenable_store_fails_at_connect() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("no-such-dir").join("ssms.db");
        let err = SchemaBootstrapper::new(DbConfig::sqlite(missing))
            .run()
            .await
            .unwrap_err();

        assert_eq!(err.step, "connect");
        assert_eq!(err.source.kind(), crate::FailureKind::Connectivity);
    }

    #[tokio::test]
    async fn test_fresh_sqlite_file() {
        let dir = TempDir::new().unwrap();
        let report = SchemaBootstrapper::new(DbConfig::sqlite(dir.path().join("ssms.db")))
            .run()
            .await
            .unwrap();

        assert_eq!(report.tables, TABLES.len());
        assert_eq!(report.seed_statements, 26);
        assert_eq!(report.rows_inserted, 26);
    }
}
