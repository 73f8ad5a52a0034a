//! # ssms-db: Data-Access Layer for SSMS
//!
//! Connection parameters, scoped sessions, schema bootstrap and the typed
//! queries behind each view of the Sales & Stock Management System.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SSMS Data Flow                                   │
//! │                                                                         │
//! │  View (dashboard, sales, inventory, purchases, reports, login)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     ssms-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │   DbConfig    │    │  Repositories │    │    Schema    │   │   │
//! │  │   │  (config.rs)  │    │  (store.rs)   │    │ Bootstrapper │   │   │
//! │  │   └───────┬───────┘    └───────┬───────┘    └──────┬───────┘   │   │
//! │  │           └────────────────────┼───────────────────┘           │   │
//! │  │                                ▼                               │   │
//! │  │                 Session (session.rs)                           │   │
//! │  │                 acquire → execute_query → release              │   │
//! │  │                                │                               │   │
//! │  │                 Connector / DbHandle (connector.rs)            │   │
//! │  └────────────────────────────────┼───────────────────────────────┘   │
//! │                                   ▼                                     │
//! │              MySQL server (default)  or  SQLite file                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Connection parameters from the environment, overrides
//! - [`connector`] - The driver seam and its sqlx implementation
//! - [`session`] - Scoped acquire/run/release and [`QueryResult`]
//! - [`schema`] - Table definitions, seed data, [`SchemaBootstrapper`]
//! - [`store`] / [`repository`] - Typed queries per view
//! - [`settings_file`] - The JSON preferences file
//! - [`password`] - Argon2 hashing for `users`
//! - [`error`] - [`DbError`] and its [`FailureKind`]
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ssms_db::{DbConfig, Store};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Store::new(DbConfig::sqlite("ssms.db"));
//! store.bootstrap(None).await?;
//!
//! let products = store.products().list().await?;
//! println!("{} products", products.len());
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod connector;
pub mod error;
pub mod password;
pub mod repository;
pub mod schema;
pub mod session;
pub mod settings_file;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{Backend, ConfigOverrides, DbConfig};
pub use connector::{Connector, DbHandle, Outcome, SqlxConnector, SqlxHandle};
pub use error::{DbError, DbResult, FailureKind};
pub use schema::{BootstrapError, BootstrapReport, SchemaBootstrapper};
pub use session::{QueryResult, Session};
pub use settings_file::{SettingsFile, SettingsFileError, SettingsMap};
pub use store::Store;

// Repository re-exports for convenience
pub use repository::{
    AuditRepository, CustomerRepository, ProductRepository, PurchaseRepository, ReportRepository,
    SaleRepository, SettingRepository, SupplierRepository, UserRepository,
};

use tracing_subscriber::EnvFilter;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,ssms=debug,sqlx=warn";

/// Installs the fmt subscriber, filtered by `RUST_LOG`.
///
/// Call once, at the start of a binary.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
