//! Supplier purchases for the purchases view.
//!
//! A purchase linked to a product adds its quantity to stock with an
//! `IN` / `PURCHASE` movement.

use ssms_core::validation::{validate_name, validate_price_cents, validate_quantity};
use ssms_core::{params, BusinessRules, NewPurchase, PaymentStatus, Purchase, ReferenceType};
use tracing::{debug, info};

use crate::connector::{Connector, SqlxConnector};
use crate::error::{DbError, DbResult};
use crate::repository::next_sequence;
use crate::repository::product::StockAdjustment;
use crate::store::Store;

#[derive(Debug, Clone)]
pub struct PurchaseRepository<C: Connector + Clone = SqlxConnector> {
    store: Store<C>,
}

impl<C: Connector + Clone> PurchaseRepository<C> {
    pub fn new(store: Store<C>) -> Self {
        PurchaseRepository { store }
    }

    /// All purchases, newest purchase date first.
    pub async fn list(&self) -> DbResult<Vec<Purchase>> {
        self.store
            .query(
                "SELECT * FROM purchases ORDER BY purchase_date DESC, id DESC",
                (),
            )
            .await
            .into_records()
    }

    pub async fn get_by_number(&self, purchase_number: &str) -> DbResult<Option<Purchase>> {
        self.store
            .query(
                "SELECT * FROM purchases WHERE purchase_number = ?",
                params![purchase_number],
            )
            .await
            .into_first()
    }

    /// Next free purchase number for `rules.purchase_prefix`.
    pub async fn next_purchase_number(&self, rules: &BusinessRules) -> DbResult<String> {
        let rows = self
            .store
            .query(
                "SELECT purchase_number FROM purchases WHERE purchase_number LIKE ?",
                params![format!("{}-%", rules.purchase_prefix)],
            )
            .await
            .into_rows()?;
        let used = rows
            .iter()
            .filter_map(|row| row.get_str("purchase_number").ok());
        Ok(rules.purchase_number(next_sequence(&rules.purchase_prefix, used)))
    }

    /// Inserts a purchase under the next purchase number.
    ///
    /// When `product_id` is set the product must exist; its name fills in a
    /// missing `product_name` and its stock grows by the quantity.
    pub async fn insert(&self, purchase: &NewPurchase, rules: &BusinessRules) -> DbResult<Purchase> {
        validate_name("supplier_name", &purchase.supplier_name)?;
        validate_quantity(purchase.quantity)?;
        validate_price_cents("unit_price", purchase.unit_price.cents())?;

        let product = match purchase.product_id {
            Some(id) => Some(
                self.store
                    .products()
                    .get(id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Product", id))?,
            ),
            None => None,
        };
        let product_name = purchase
            .product_name
            .clone()
            .or_else(|| product.as_ref().map(|p| p.name.clone()));

        let number = self.next_purchase_number(rules).await?;
        debug!(purchase_number = %number, supplier = %purchase.supplier_name, "Inserting purchase");

        self.store
            .query(
                "INSERT INTO purchases (purchase_number, supplier_name, product_id, product_name, \
                 quantity, unit_price_cents, total_amount_cents, purchase_date, payment_method, \
                 payment_status, notes) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    number.as_str(),
                    purchase.supplier_name.as_str(),
                    purchase.product_id,
                    product_name,
                    purchase.quantity,
                    purchase.unit_price,
                    purchase.unit_price * purchase.quantity,
                    purchase.purchase_date,
                    purchase.payment_method,
                    purchase.payment_status,
                    purchase.notes.as_deref()
                ],
            )
            .await
            .into_affected()?;

        let stored = self
            .get_by_number(&number)
            .await?
            .ok_or_else(|| DbError::not_found("Purchase", &number))?;

        if let Some(product) = product {
            self.store
                .products()
                .adjust_stock(&StockAdjustment {
                    product_id: product.id,
                    delta: purchase.quantity,
                    reference: ReferenceType::Purchase,
                    reference_id: Some(stored.id),
                    notes: Some(format!("Purchase {}", number)),
                })
                .await?;
        }

        info!(purchase_number = %number, total = %stored.total_amount, "Purchase recorded");
        Ok(stored)
    }

    pub async fn update_status(&self, id: i64, status: PaymentStatus) -> DbResult<()> {
        debug!(id, status = %status, "Updating purchase status");
        let affected = self
            .store
            .query(
                "UPDATE purchases SET payment_status = ?, updated_at = CURRENT_TIMESTAMP \
                 WHERE id = ?",
                params![status, id],
            )
            .await
            .into_affected()?;
        if affected == 0 {
            return Err(DbError::not_found("Purchase", id));
        }
        Ok(())
    }

    /// Deletes a purchase record. Stock already received is left as is.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting purchase");
        let affected = self
            .store
            .query("DELETE FROM purchases WHERE id = ?", params![id])
            .await
            .into_affected()?;
        if affected == 0 {
            return Err(DbError::not_found("Purchase", id));
        }
        Ok(())
    }

    /// Purchases still awaiting payment.
    pub async fn pending_count(&self) -> DbResult<i64> {
        self.store
            .query(
                "SELECT COUNT(*) FROM purchases WHERE payment_status = ?",
                params![PaymentStatus::Pending],
            )
            .await
            .into_scalar()
    }
}
