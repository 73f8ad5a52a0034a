//! # Product Repository
//!
//! Catalogue queries and stock bookkeeping.
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  adjust_stock(product 4, delta -3, SALE)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE products SET stock_quantity = stock_quantity + (-3)             │
//! │   WHERE id = 4 AND stock_quantity + (-3) >= 0                           │
//! │       │                                                                 │
//! │       ├── 1 row  → INSERT stock_movements (OUT, 3, SALE)                │
//! │       └── 0 rows → product missing (NotFound) or short (InsufficientStock)
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The guard lives in the UPDATE, so two clients selling the last unit can't
//! both succeed.

use ssms_core::validation::{
    validate_name, validate_price_cents, validate_sku, validate_stock_level,
};
use ssms_core::{
    params, CoreError, MovementType, NewProduct, Product, ReferenceType, StockMovement,
};
use tracing::debug;

use crate::connector::{Connector, SqlxConnector};
use crate::error::{DbError, DbResult};
use crate::store::Store;

/// One stock change and what caused it.
#[derive(Debug, Clone, PartialEq)]
pub struct StockAdjustment {
    pub product_id: i64,
    /// Positive adds stock, negative removes it.
    pub delta: i64,
    pub reference: ReferenceType,
    pub reference_id: Option<i64>,
    pub notes: Option<String>,
}

impl StockAdjustment {
    /// A manual correction.
    pub fn manual(product_id: i64, delta: i64) -> Self {
        StockAdjustment {
            product_id,
            delta,
            reference: ReferenceType::Adjustment,
            reference_id: None,
            notes: None,
        }
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Manual corrections are logged as `ADJUSTMENT` with the signed delta;
    /// everything else as `IN` / `OUT` with the absolute quantity.
    fn movement(&self) -> (MovementType, i64) {
        match self.reference {
            ReferenceType::Adjustment => (MovementType::Adjustment, self.delta),
            _ if self.delta < 0 => (MovementType::Out, -self.delta),
            _ => (MovementType::In, self.delta),
        }
    }
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository<C: Connector + Clone = SqlxConnector> {
    store: Store<C>,
}

impl<C: Connector + Clone> ProductRepository<C> {
    pub fn new(store: Store<C>) -> Self {
        ProductRepository { store }
    }

    /// Active products, by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        self.store
            .query(
                "SELECT * FROM products WHERE is_active = 1 ORDER BY name",
                (),
            )
            .await
            .into_records()
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Product>> {
        self.store
            .query("SELECT * FROM products WHERE id = ?", params![id])
            .await
            .into_first()
    }

    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        self.store
            .query("SELECT * FROM products WHERE sku = ?", params![sku])
            .await
            .into_first()
    }

    /// Scanner lookup: a barcode or a SKU, active products only.
    pub async fn find_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let code = code.trim();
        debug!(code = %code, "Looking up scanned code");
        self.store
            .query(
                "SELECT * FROM products WHERE is_active = 1 AND (barcode = ? OR sku = ?) \
                 ORDER BY id LIMIT 1",
                params![code, code],
            )
            .await
            .into_first()
    }

    /// Validates and inserts a product, returning the stored row.
    ///
    /// ## Errors
    /// - `Core(Validation)` for bad input
    /// - `UniqueViolation` when the SKU is taken
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        validate_sku(&product.sku)?;
        validate_name("name", &product.name)?;
        validate_price_cents("purchase_price", product.purchase_price.cents())?;
        validate_price_cents("selling_price", product.selling_price.cents())?;
        validate_stock_level("stock_quantity", product.stock_quantity)?;
        validate_stock_level("min_stock_level", product.min_stock_level)?;

        debug!(sku = %product.sku, "Inserting product");

        self.store
            .query(
                "INSERT INTO products (name, sku, category, description, purchase_price_cents, \
                 selling_price_cents, stock_quantity, min_stock_level, unit, supplier, barcode) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    product.name.as_str(),
                    product.sku.as_str(),
                    product.category.as_deref(),
                    product.description.as_deref(),
                    product.purchase_price,
                    product.selling_price,
                    product.stock_quantity,
                    product.min_stock_level,
                    product.unit.as_str(),
                    product.supplier.as_deref(),
                    product.barcode.as_deref()
                ],
            )
            .await
            .into_affected()?;

        self.get_by_sku(&product.sku)
            .await?
            .ok_or_else(|| DbError::not_found("Product", &product.sku))
    }

    /// Applies a stock change and logs it in `stock_movements`.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown product
    /// - `Core(InsufficientStock)` when stock would go negative
    pub async fn adjust_stock(&self, adjustment: &StockAdjustment) -> DbResult<Product> {
        self.apply_delta(adjustment.product_id, adjustment.delta)
            .await?;
        self.record_movement(adjustment).await?;
        self.get(adjustment.product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", adjustment.product_id))
    }

    /// The guarded stock UPDATE alone, without a movement row.
    pub(crate) async fn apply_delta(&self, product_id: i64, delta: i64) -> DbResult<()> {
        debug!(product_id, delta, "Updating stock");

        let affected = self
            .store
            .query(
                "UPDATE products SET stock_quantity = stock_quantity + ?, \
                 updated_at = CURRENT_TIMESTAMP \
                 WHERE id = ? AND stock_quantity + ? >= 0",
                params![delta, product_id, delta],
            )
            .await
            .into_affected()?;

        if affected > 0 {
            return Ok(());
        }
        match self.get(product_id).await? {
            None => Err(DbError::not_found("Product", product_id)),
            Some(product) => Err(CoreError::InsufficientStock {
                sku: product.sku,
                available: product.stock_quantity,
                requested: -delta,
            }
            .into()),
        }
    }

    pub(crate) async fn record_movement(&self, adjustment: &StockAdjustment) -> DbResult<()> {
        let (movement_type, quantity) = adjustment.movement();
        self.store
            .query(
                "INSERT INTO stock_movements \
                 (product_id, movement_type, quantity, reference_type, reference_id, notes) \
                 VALUES (?, ?, ?, ?, ?, ?)",
                params![
                    adjustment.product_id,
                    movement_type,
                    quantity,
                    adjustment.reference,
                    adjustment.reference_id,
                    adjustment.notes.as_deref()
                ],
            )
            .await
            .into_affected()
            .map(|_| ())
    }

    /// Movement history of one product, newest first.
    pub async fn movements(&self, product_id: i64) -> DbResult<Vec<StockMovement>> {
        self.store
            .query(
                "SELECT * FROM stock_movements WHERE product_id = ? ORDER BY id DESC",
                params![product_id],
            )
            .await
            .into_records()
    }

    /// Active products at or below `threshold` units, emptiest first.
    pub async fn low_stock(&self, threshold: i64) -> DbResult<Vec<Product>> {
        self.store
            .query(
                "SELECT * FROM products WHERE is_active = 1 AND stock_quantity <= ? \
                 ORDER BY stock_quantity, name",
                params![threshold],
            )
            .await
            .into_records()
    }

    /// Active products with stock on hand.
    pub async fn count_in_stock(&self) -> DbResult<i64> {
        self.store
            .query(
                "SELECT COUNT(*) FROM products WHERE is_active = 1 AND stock_quantity > 0",
                (),
            )
            .await
            .into_scalar()
    }

    /// Counts active products.
    pub async fn count(&self) -> DbResult<i64> {
        self.store
            .query("SELECT COUNT(*) FROM products WHERE is_active = 1", ())
            .await
            .into_scalar()
    }
}
