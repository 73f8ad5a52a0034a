//! # Store
//!
//! Entry point for the views: holds the configuration and connector, and
//! hands out repositories.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Store { DbConfig, Connector }                                          │
//! │       │                                                                 │
//! │       ├── products() / customers() / sales() / ...   repositories       │
//! │       ├── health_check()                             SELECT 1           │
//! │       └── bootstrap(admin_password)                  schema + seeds     │
//! │                                                                         │
//! │  Every repository call runs on a Session of its own:                    │
//! │  acquire → run → release. Nothing stays open between calls.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use ssms_core::Params;
use tracing::info;

use crate::config::DbConfig;
use crate::connector::{Connector, SqlxConnector};
use crate::repository::{
    AuditRepository, CustomerRepository, ProductRepository, PurchaseRepository,
    ReportRepository, SaleRepository, SettingRepository, SupplierRepository, UserRepository,
};
use crate::schema::{BootstrapError, BootstrapReport, SchemaBootstrapper};
use crate::session::{QueryResult, Session};

/// Configuration plus connector; cheap to clone.
///
/// ## Usage
/// ```rust,no_run
/// use ssms_db::{DbConfig, Store};
///
/// # async fn demo() -> ssms_db::DbResult<()> {
/// let store = Store::new(DbConfig::sqlite("ssms.db"));
/// if store.health_check().await {
///     for product in store.products().low_stock(10).await? {
///         println!("{} ({} left)", product.name, product.stock_quantity);
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Store<C: Connector + Clone = SqlxConnector> {
    config: DbConfig,
    connector: C,
}

impl Store<SqlxConnector> {
    pub fn new(config: DbConfig) -> Self {
        Store::with_connector(config, SqlxConnector)
    }

    /// Store over the environment configuration.
    pub fn from_env() -> Self {
        Store::new(DbConfig::from_env())
    }
}

impl<C: Connector + Clone> Store<C> {
    pub fn with_connector(config: DbConfig, connector: C) -> Self {
        Store { config, connector }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// A fresh Session over this store's configuration.
    pub fn session(&self) -> Session<C> {
        Session::with_connector(self.config.clone(), self.connector.clone())
    }

    /// Runs one statement on a fresh Session.
    pub async fn query(&self, sql: &str, params: impl Into<Params>) -> QueryResult {
        self.session().execute_query(sql, params).await
    }

    /// Whether the store answers `SELECT 1`.
    pub async fn health_check(&self) -> bool {
        Session::test_connection_with(self.config.clone(), self.connector.clone()).await
    }

    /// Creates the schema and seeds it; see [`SchemaBootstrapper`].
    pub async fn bootstrap(
        &self,
        admin_password: Option<&str>,
    ) -> Result<BootstrapReport, BootstrapError> {
        let mut bootstrapper =
            SchemaBootstrapper::with_connector(self.config.clone(), self.connector.clone());
        if let Some(password) = admin_password {
            bootstrapper = bootstrapper.admin_password(password);
        }
        let report = bootstrapper.run().await?;
        info!(rows_inserted = report.rows_inserted, "Store bootstrapped");
        Ok(report)
    }

    // =========================================================================
    // Repository Accessors
    // =========================================================================

    pub fn products(&self) -> ProductRepository<C> {
        ProductRepository::new(self.clone())
    }

    pub fn customers(&self) -> CustomerRepository<C> {
        CustomerRepository::new(self.clone())
    }

    pub fn suppliers(&self) -> SupplierRepository<C> {
        SupplierRepository::new(self.clone())
    }

    pub fn sales(&self) -> SaleRepository<C> {
        SaleRepository::new(self.clone())
    }

    pub fn purchases(&self) -> PurchaseRepository<C> {
        PurchaseRepository::new(self.clone())
    }

    pub fn settings(&self) -> SettingRepository<C> {
        SettingRepository::new(self.clone())
    }

    pub fn users(&self) -> UserRepository<C> {
        UserRepository::new(self.clone())
    }

    pub fn audit(&self) -> AuditRepository<C> {
        AuditRepository::new(self.clone())
    }

    pub fn reports(&self) -> ReportRepository<C> {
        ReportRepository::new(self.clone())
    }
}
