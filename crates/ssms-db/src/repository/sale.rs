//! # Sale Repository
//!
//! Invoices for the sales view and reports.
//!
//! ## Recording a Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record(NewSale, rules)                                                 │
//! │   1. validate quantity, load product (and customer name)                │
//! │   2. totals: unit × qty − discount, + tax on the discounted amount      │
//! │   3. next invoice number  INV-000042                                    │
//! │   4. guarded stock decrement          ── short → InsufficientStock      │
//! │   5. INSERT sales                     ── fails → stock put back         │
//! │   6. INSERT stock_movements (OUT, SALE, sale id)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use ssms_core::validation::{validate_date_range, validate_discount_cents, validate_quantity, validate_tax_rate_bps};
use ssms_core::{params, BusinessRules, NewSale, ReferenceType, Sale, SaleTotals};
use tracing::{debug, error, info, warn};

use crate::connector::{Connector, SqlxConnector};
use crate::error::{DbError, DbResult};
use crate::repository::next_sequence;
use crate::repository::product::StockAdjustment;
use crate::store::Store;

#[derive(Debug, Clone)]
pub struct SaleRepository<C: Connector + Clone = SqlxConnector> {
    store: Store<C>,
}

impl<C: Connector + Clone> SaleRepository<C> {
    pub fn new(store: Store<C>) -> Self {
        SaleRepository { store }
    }

    pub async fn get_by_invoice(&self, invoice_number: &str) -> DbResult<Option<Sale>> {
        self.store
            .query(
                "SELECT * FROM sales WHERE invoice_number = ?",
                params![invoice_number],
            )
            .await
            .into_first()
    }

    /// Next free invoice number for `rules.invoice_prefix`.
    pub async fn next_invoice_number(&self, rules: &BusinessRules) -> DbResult<String> {
        let rows = self
            .store
            .query(
                "SELECT invoice_number FROM sales WHERE invoice_number LIKE ?",
                params![format!("{}-%", rules.invoice_prefix)],
            )
            .await
            .into_rows()?;
        let used = rows
            .iter()
            .filter_map(|row| row.get_str("invoice_number").ok());
        Ok(rules.invoice_number(next_sequence(&rules.invoice_prefix, used)))
    }

    /// Records a sale and takes its quantity out of stock.
    ///
    /// Unit price defaults to the product's selling price and the tax rate
    /// to `rules.default_tax_rate`.
    ///
    /// ## Errors
    /// - `Core(Validation)` for a bad quantity, discount or tax rate
    /// - `NotFound` for an unknown product or customer
    /// - `Core(InsufficientStock)` when stock is short
    ///
    /// ## Partial success
    /// Once the sale row is stored the sale counts as recorded. A failed
    /// stock-movement insert after that point is logged and the sale is
    /// still returned. If the stored row cannot be read back, the error is
    /// returned although the sale exists; look it up by the invoice number
    /// in the log.
    pub async fn record(&self, sale: &NewSale, rules: &BusinessRules) -> DbResult<Sale> {
        validate_quantity(sale.quantity)?;

        let products = self.store.products();
        let product = products
            .get(sale.product_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| DbError::not_found("Product", sale.product_id))?;

        let customer_name = match sale.customer_id {
            Some(id) => Some(
                self.store
                    .customers()
                    .get(id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Customer", id))?
                    .name,
            ),
            None => None,
        };

        let unit_price = sale.unit_price.unwrap_or(product.selling_price);
        let rate = sale.tax_rate.unwrap_or(rules.default_tax_rate);
        validate_tax_rate_bps(rate.bps())?;
        validate_discount_cents(sale.discount.cents(), (unit_price * sale.quantity).cents())?;
        let totals = SaleTotals::compute(unit_price, sale.quantity, sale.discount, rate);

        let invoice = self.next_invoice_number(rules).await?;
        debug!(invoice = %invoice, sku = %product.sku, quantity = sale.quantity, "Recording sale");

        products.apply_delta(product.id, -sale.quantity).await?;

        let inserted = self
            .store
            .query(
                "INSERT INTO sales (invoice_number, customer_id, customer_name, product_id, \
                 product_name, quantity, unit_price_cents, total_amount_cents, \
                 discount_amount_cents, tax_amount_cents, payment_method, payment_status, notes) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    invoice.as_str(),
                    sale.customer_id,
                    customer_name,
                    product.id,
                    product.name.as_str(),
                    sale.quantity,
                    unit_price,
                    totals.total,
                    totals.discount,
                    totals.tax,
                    sale.payment_method,
                    sale.payment_status,
                    sale.notes.as_deref()
                ],
            )
            .await
            .into_affected();

        if let Err(err) = inserted {
            if let Err(restore) = products.apply_delta(product.id, sale.quantity).await {
                warn!(
                    product_id = product.id,
                    error = %restore,
                    "Failed to put stock back after a rejected sale"
                );
            }
            return Err(err);
        }

        let recorded = match self.get_by_invoice(&invoice).await {
            Ok(Some(recorded)) => recorded,
            Ok(None) => return Err(DbError::not_found("Sale", &invoice)),
            Err(err) => {
                error!(invoice = %invoice, error = %err, "Sale stored but could not be read back");
                return Err(err);
            }
        };

        let movement = StockAdjustment {
            product_id: product.id,
            delta: -sale.quantity,
            reference: ReferenceType::Sale,
            reference_id: Some(recorded.id),
            notes: Some(format!("Sale {}", invoice)),
        };
        if let Err(err) = products.record_movement(&movement).await {
            warn!(
                invoice = %invoice,
                product_id = product.id,
                error = %err,
                "Sale recorded without its stock movement"
            );
        }

        info!(invoice = %invoice, total = %totals.total, "Sale recorded");
        Ok(recorded)
    }

    /// Latest sales, newest first.
    pub async fn recent(&self, limit: i64) -> DbResult<Vec<Sale>> {
        self.store
            .query(
                "SELECT * FROM sales ORDER BY created_at DESC, id DESC LIMIT ?",
                params![limit],
            )
            .await
            .into_records()
    }

    /// Sales whose date falls in `start..=end`, oldest first.
    pub async fn between(&self, start: NaiveDate, end: NaiveDate) -> DbResult<Vec<Sale>> {
        validate_date_range(start, end)?;
        self.store
            .query(
                "SELECT * FROM sales WHERE DATE(created_at) BETWEEN ? AND ? \
                 ORDER BY created_at, id",
                params![start, end],
            )
            .await
            .into_records()
    }
}
