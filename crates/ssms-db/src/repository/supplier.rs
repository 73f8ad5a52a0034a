//! Supplier queries for the purchases view.

use ssms_core::validation::{validate_email, validate_name, validate_phone};
use ssms_core::{params, NewSupplier, Supplier};
use tracing::debug;

use crate::connector::{Connector, SqlxConnector};
use crate::error::{DbError, DbResult};
use crate::store::Store;

#[derive(Debug, Clone)]
pub struct SupplierRepository<C: Connector + Clone = SqlxConnector> {
    store: Store<C>,
}

impl<C: Connector + Clone> SupplierRepository<C> {
    pub fn new(store: Store<C>) -> Self {
        SupplierRepository { store }
    }

    /// Active suppliers, by name.
    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        self.store
            .query("SELECT * FROM suppliers WHERE is_active = 1 ORDER BY name", ())
            .await
            .into_records()
    }

    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Supplier>> {
        self.store
            .query("SELECT * FROM suppliers WHERE name = ?", params![name])
            .await
            .into_first()
    }

    /// Validates and inserts a supplier. Names are unique.
    pub async fn insert(&self, supplier: &NewSupplier) -> DbResult<Supplier> {
        validate_name("name", &supplier.name)?;
        validate_email(supplier.email.as_deref())?;
        validate_phone(supplier.phone.as_deref())?;

        debug!(name = %supplier.name, "Inserting supplier");

        self.store
            .query(
                "INSERT INTO suppliers (name, contact_person, email, phone, address, city, state, \
                 pincode, payment_terms, notes) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    supplier.name.as_str(),
                    supplier.contact_person.as_deref(),
                    supplier.email.as_deref(),
                    supplier.phone.as_deref(),
                    supplier.address.as_deref(),
                    supplier.city.as_deref(),
                    supplier.state.as_deref(),
                    supplier.pincode.as_deref(),
                    supplier.payment_terms.as_deref(),
                    supplier.notes.as_deref()
                ],
            )
            .await
            .into_affected()?;

        self.get_by_name(&supplier.name)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", &supplier.name))
    }
}
