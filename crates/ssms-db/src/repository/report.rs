//! # Report Repository
//!
//! Aggregate figures for the dashboard and reports views.
//!
//! Date ranges are inclusive and compare on `DATE(created_at)`, which both
//! backends support. Sums are wrapped in `COALESCE(.., 0)` so an empty range
//! reads as zero rather than NULL.

use chrono::NaiveDate;
use serde::Serialize;
use ssms_core::validation::validate_date_range;
use ssms_core::{params, CoreResult, FromRow, Money, PaymentStatus, Row};

use crate::connector::{Connector, SqlxConnector};
use crate::error::DbResult;
use crate::store::Store;

/// Dashboard header cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_products: i64,
    pub low_stock_products: i64,
    pub total_customers: i64,
    pub today_sales: Money,
    pub today_transactions: i64,
    pub pending_purchases: i64,
    /// Stock on hand at purchase price.
    pub inventory_value: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SalesSummary {
    pub transactions: i64,
    pub units: i64,
    pub revenue: Money,
    pub tax: Money,
    pub discount: Money,
}

impl SalesSummary {
    /// Revenue per transaction, truncated to the cent.
    pub fn average_sale(&self) -> Money {
        if self.transactions == 0 {
            return Money::zero();
        }
        Money::from_cents(self.revenue.cents() / self.transactions)
    }
}

impl FromRow for SalesSummary {
    fn from_row(row: &Row) -> CoreResult<Self> {
        Ok(SalesSummary {
            transactions: row.get_i64("transactions")?,
            units: row.get_i64("units")?,
            revenue: Money::from_cents(row.get_i64("revenue")?),
            tax: Money::from_cents(row.get_i64("tax")?),
            discount: Money::from_cents(row.get_i64("discount")?),
        })
    }
}

/// One line of the best-sellers table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSales {
    pub product_id: Option<i64>,
    pub product_name: Option<String>,
    pub units: i64,
    pub revenue: Money,
}

impl FromRow for ProductSales {
    fn from_row(row: &Row) -> CoreResult<Self> {
        Ok(ProductSales {
            product_id: row.get_opt_i64("product_id")?,
            product_name: row.get_opt_string("product_name")?,
            units: row.get_i64("units")?,
            revenue: Money::from_cents(row.get_i64("revenue")?),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProfitReport {
    pub revenue: Money,
    /// Units sold at the product's current purchase price.
    pub cost: Money,
}

impl ProfitReport {
    pub fn gross_profit(&self) -> Money {
        self.revenue - self.cost
    }

    /// `None` when nothing was sold.
    pub fn margin_bps(&self) -> Option<i64> {
        self.revenue.margin_bps(self.cost)
    }
}

impl FromRow for ProfitReport {
    fn from_row(row: &Row) -> CoreResult<Self> {
        Ok(ProfitReport {
            revenue: Money::from_cents(row.get_i64("revenue")?),
            cost: Money::from_cents(row.get_i64("cost")?),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ReportRepository<C: Connector + Clone = SqlxConnector> {
    store: Store<C>,
}

impl<C: Connector + Clone> ReportRepository<C> {
    pub fn new(store: Store<C>) -> Self {
        ReportRepository { store }
    }

    /// Figures for the dashboard. `today` is the caller's local date.
    pub async fn dashboard(&self, low_stock_threshold: i64, today: NaiveDate) -> DbResult<DashboardStats> {
        let total_products = self.store.products().count().await?;
        let total_customers = self.store.customers().count().await?;
        let pending_purchases = self.store.purchases().pending_count().await?;

        let low_stock_products = self
            .store
            .query(
                "SELECT COUNT(*) FROM products WHERE is_active = 1 AND stock_quantity <= ?",
                params![low_stock_threshold],
            )
            .await
            .into_scalar()?;

        let today_sales = self
            .store
            .query(
                "SELECT COALESCE(SUM(total_amount_cents), 0) FROM sales \
                 WHERE DATE(created_at) = ? AND payment_status <> ?",
                params![today, PaymentStatus::Refunded],
            )
            .await
            .into_scalar()?;

        let today_transactions = self
            .store
            .query(
                "SELECT COUNT(*) FROM sales WHERE DATE(created_at) = ?",
                params![today],
            )
            .await
            .into_scalar()?;

        let inventory_value = self
            .store
            .query(
                "SELECT COALESCE(SUM(purchase_price_cents * stock_quantity), 0) FROM products \
                 WHERE is_active = 1",
                (),
            )
            .await
            .into_scalar()?;

        Ok(DashboardStats {
            total_products,
            low_stock_products,
            total_customers,
            today_sales: Money::from_cents(today_sales),
            today_transactions,
            pending_purchases,
            inventory_value: Money::from_cents(inventory_value),
        })
    }

    pub async fn sales_summary(&self, start: NaiveDate, end: NaiveDate) -> DbResult<SalesSummary> {
        validate_date_range(start, end)?;
        let summary = self
            .store
            .query(
                "SELECT COUNT(*) AS transactions, \
                 COALESCE(SUM(quantity), 0) AS units, \
                 COALESCE(SUM(total_amount_cents), 0) AS revenue, \
                 COALESCE(SUM(tax_amount_cents), 0) AS tax, \
                 COALESCE(SUM(discount_amount_cents), 0) AS discount \
                 FROM sales WHERE DATE(created_at) BETWEEN ? AND ?",
                params![start, end],
            )
            .await
            .into_first::<SalesSummary>()?;
        Ok(summary.unwrap_or(SalesSummary {
            transactions: 0,
            units: 0,
            revenue: Money::zero(),
            tax: Money::zero(),
            discount: Money::zero(),
        }))
    }

    /// Best sellers by revenue.
    pub async fn top_products(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: i64,
    ) -> DbResult<Vec<ProductSales>> {
        validate_date_range(start, end)?;
        self.store
            .query(
                "SELECT product_id, product_name, \
                 SUM(quantity) AS units, SUM(total_amount_cents) AS revenue \
                 FROM sales WHERE DATE(created_at) BETWEEN ? AND ? \
                 GROUP BY product_id, product_name \
                 ORDER BY revenue DESC, units DESC LIMIT ?",
                params![start, end, limit],
            )
            .await
            .into_records()
    }

    pub async fn profit(&self, start: NaiveDate, end: NaiveDate) -> DbResult<ProfitReport> {
        validate_date_range(start, end)?;
        let report = self
            .store
            .query(
                "SELECT COALESCE(SUM(s.total_amount_cents), 0) AS revenue, \
                 COALESCE(SUM(s.quantity * p.purchase_price_cents), 0) AS cost \
                 FROM sales s JOIN products p ON p.id = s.product_id \
                 WHERE DATE(s.created_at) BETWEEN ? AND ?",
                params![start, end],
            )
            .await
            .into_first::<ProfitReport>()?;
        Ok(report.unwrap_or(ProfitReport {
            revenue: Money::zero(),
            cost: Money::zero(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_sale() {
        let summary = SalesSummary {
            transactions: 3,
            units: 13,
            revenue: Money::from_cents(7_090_000),
            tax: Money::zero(),
            discount: Money::zero(),
        };
        assert_eq!(summary.average_sale().cents(), 2_363_333);

        let empty = SalesSummary {
            transactions: 0,
            ..summary
        };
        assert_eq!(empty.average_sale(), Money::zero());
    }

    #[test]
    fn test_profit_margin() {
        let report = ProfitReport {
            revenue: Money::from_cents(6_500_000),
            cost: Money::from_cents(5_000_000),
        };
        assert_eq!(report.gross_profit().cents(), 1_500_000);
        assert_eq!(report.margin_bps(), Some(2307));
    }
}
