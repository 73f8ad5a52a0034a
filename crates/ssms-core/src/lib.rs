//! # ssms-core: Pure Types and Rules for SSMS
//!
//! Everything the data-access layer needs that does not touch I/O: the
//! value/row model the session manager moves around, statement
//! classification and parameter binding, domain records, money and
//! business rules.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Sales & Stock Management System                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   Views: dashboard, sales, inventory, purchases, reports, ...   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │   ssms-db: Session, SchemaBootstrapper, repositories            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ ssms-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   value   │  │ statement │  │   types   │  │   money   │  │   │
//! │  │   │ Value/Row │  │ Kind/Param│  │  records  │  │  TaxRate  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`value`] - `Value`, `Row`, `FromRow`
//! - [`statement`] - `StatementKind` classification, `Params` binding
//! - [`types`] - Domain records (Product, Sale, Customer, ...)
//! - [`money`] - Integer-cent money and basis-point tax rates
//! - [`config`] - Business rules and security policy
//! - [`validation`] - Input checks
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```rust
//! use ssms_core::{params, Params, StatementKind};
//!
//! let bound = params!["LAP001"]
//!     .bind("SELECT * FROM products WHERE sku = ?")
//!     .unwrap();
//! assert_eq!(bound.kind, StatementKind::Read);
//! assert_eq!(bound.values.len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod money;
pub mod statement;
pub mod types;
pub mod validation;
pub mod value;

// `use ssms_core::Money` instead of `use ssms_core::money::Money`
pub use config::{AppInfo, BusinessRules, SecurityPolicy, APP_INFO};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, TaxRate};
pub use statement::{BoundStatement, Params, StatementKind};
pub use types::*;
pub use value::{FromRow, Row, Value, DATE_FORMAT, TIMESTAMP_FORMAT};
