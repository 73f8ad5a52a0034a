//! Customer queries for the customers and sales views.

use ssms_core::validation::{validate_email, validate_name, validate_phone, validate_search_query};
use ssms_core::{params, Customer, NewCustomer};
use tracing::debug;

use crate::connector::{Connector, SqlxConnector};
use crate::error::{DbError, DbResult};
use crate::store::Store;

#[derive(Debug, Clone)]
pub struct CustomerRepository<C: Connector + Clone = SqlxConnector> {
    store: Store<C>,
}

impl<C: Connector + Clone> CustomerRepository<C> {
    pub fn new(store: Store<C>) -> Self {
        CustomerRepository { store }
    }

    /// Active customers, by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        self.store
            .query("SELECT * FROM customers WHERE is_active = 1 ORDER BY name", ())
            .await
            .into_records()
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Customer>> {
        self.store
            .query("SELECT * FROM customers WHERE id = ?", params![id])
            .await
            .into_first()
    }

    /// Active customers whose name, email or phone contains `fragment`.
    pub async fn search(&self, fragment: &str) -> DbResult<Vec<Customer>> {
        let fragment = validate_search_query(fragment)?;
        if fragment.is_empty() {
            return self.list().await;
        }
        let pattern = format!("%{}%", fragment);
        self.store
            .query(
                "SELECT * FROM customers WHERE is_active = 1 \
                 AND (name LIKE ? OR email LIKE ? OR phone LIKE ?) ORDER BY name",
                params![pattern.as_str(), pattern.as_str(), pattern.as_str()],
            )
            .await
            .into_records()
    }

    /// Validates and inserts a customer, returning the stored row.
    pub async fn insert(&self, customer: &NewCustomer) -> DbResult<Customer> {
        validate_name("name", &customer.name)?;
        validate_email(customer.email.as_deref())?;
        validate_phone(customer.phone.as_deref())?;

        debug!(name = %customer.name, "Inserting customer");

        self.store
            .query(
                "INSERT INTO customers (name, email, phone, address, city, state, pincode, \
                 customer_type, credit_limit_cents, notes) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    customer.name.as_str(),
                    customer.email.as_deref(),
                    customer.phone.as_deref(),
                    customer.address.as_deref(),
                    customer.city.as_deref(),
                    customer.state.as_deref(),
                    customer.pincode.as_deref(),
                    customer.customer_type,
                    customer.credit_limit,
                    customer.notes.as_deref()
                ],
            )
            .await
            .into_affected()?;

        // Email is optional, so the newest row with this name is the one.
        self.store
            .query(
                "SELECT * FROM customers WHERE name = ? ORDER BY id DESC LIMIT 1",
                params![customer.name.as_str()],
            )
            .await
            .into_first()?
            .ok_or_else(|| DbError::not_found("Customer", &customer.name))
    }

    /// Counts active customers.
    pub async fn count(&self) -> DbResult<i64> {
        self.store
            .query("SELECT COUNT(*) FROM customers WHERE is_active = 1", ())
            .await
            .into_scalar()
    }
}
