//! # Repository Module
//!
//! Typed queries for each view of the application.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  View                                                                   │
//! │       │  store.products().low_stock(10)                                 │
//! │       ▼                                                                 │
//! │  ProductRepository                                                      │
//! │       │  SQL + Params                                                   │
//! │       ▼                                                                 │
//! │  Session::execute_query   (own connection, released before returning)   │
//! │       │  QueryResult                                                    │
//! │       ▼                                                                 │
//! │  into_records::<Product>() → DbResult<Vec<Product>>                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Statements use `?` placeholders, which both backends accept. Multi-step
//! operations (recording a sale) run each step on its own connection and
//! guard the stock update in SQL, so an oversell is rejected by the store
//! itself.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`] - catalogue, scanner lookup, stock movements
//! - [`CustomerRepository`] / [`SupplierRepository`] - contacts
//! - [`SaleRepository`] - invoices
//! - [`PurchaseRepository`] - supplier purchases
//! - [`SettingRepository`] - `settings` table
//! - [`UserRepository`] - login and user creation
//! - [`AuditRepository`] - audit trail
//! - [`ReportRepository`] - dashboard and report figures

pub mod audit;
pub mod customer;
pub mod product;
pub mod purchase;
pub mod report;
pub mod sale;
pub mod setting;
pub mod supplier;
pub mod user;

pub use audit::AuditRepository;
pub use customer::CustomerRepository;
pub use product::{ProductRepository, StockAdjustment};
pub use purchase::PurchaseRepository;
pub use report::{DashboardStats, ProductSales, ProfitReport, ReportRepository, SalesSummary};
pub use sale::SaleRepository;
pub use setting::SettingRepository;
pub use supplier::SupplierRepository;
pub use user::UserRepository;

/// Next number in a `PREFIX-000123` series, given the numbers already used.
pub(crate) fn next_sequence<'a>(prefix: &str, used: impl Iterator<Item = &'a str>) -> i64 {
    used.filter_map(|number| ssms_core::BusinessRules::parse_sequence(prefix, number))
        .max()
        .unwrap_or(0)
        + 1
}
