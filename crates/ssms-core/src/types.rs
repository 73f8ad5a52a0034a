//! # Domain Types
//!
//! Records for every table the schema bootstrapper creates, plus the input
//! shapes repositories accept when inserting.
//!
//! ## Tables → Records
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  users ─────────── User          (Role)                                 │
//! │  customers ─────── Customer      (CustomerType)                         │
//! │  categories ────── Category                                             │
//! │  products ──────── Product                                              │
//! │  sales ─────────── Sale          (PaymentMethod, PaymentStatus)         │
//! │  purchases ─────── Purchase      (PaymentMethod, PaymentStatus)         │
//! │  stock_movements ─ StockMovement (MovementType, ReferenceType)          │
//! │  suppliers ─────── Supplier                                             │
//! │  audit_log ─────── AuditLogEntry                                        │
//! │  settings ──────── Setting       (SettingType)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Money columns are stored as `*_cents` integers and surface as [`Money`].
//! Enum columns store the labels returned by each enum's `as_str`.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, TaxRate};
use crate::value::{FromRow, Row};

// =============================================================================
// Label Enums
// =============================================================================

/// Declares an enum stored as a fixed text label.
///
/// Generates `ALL`, `as_str`, `Display`, `FromStr` and string serde.
macro_rules! label_enum {
    (
        $(#[$meta:meta])*
        $name:ident : $kind:literal {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant, in schema order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Label stored in the database.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(CoreError::UnknownLabel {
                        kind: $kind,
                        label: other.to_string(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let label = String::deserialize(deserializer)?;
                label.parse().map_err(serde::de::Error::custom)
            }
        }

        impl From<$name> for crate::value::Value {
            fn from(v: $name) -> Self {
                crate::value::Value::Text(v.as_str().to_string())
            }
        }
    };
}

label_enum! {
    /// Application user role.
    Role: "role" {
        Admin => "Admin",
        Manager => "Manager",
        Employee => "Employee",
    }
}

label_enum! {
    CustomerType: "customer type" {
        Individual => "Individual",
        Business => "Business",
        Wholesale => "Wholesale",
        Retail => "Retail",
    }
}

label_enum! {
    /// How a sale or purchase was paid.
    ///
    /// Purchases never use `Upi`; the purchases table omits it.
    PaymentMethod: "payment method" {
        Cash => "Cash",
        Card => "Card",
        Upi => "UPI",
        BankTransfer => "Bank Transfer",
        Cheque => "Cheque",
    }
}

label_enum! {
    PaymentStatus: "payment status" {
        Pending => "Pending",
        Paid => "Paid",
        PartiallyPaid => "Partially Paid",
        Refunded => "Refunded",
    }
}

label_enum! {
    /// Direction of a stock movement.
    MovementType: "movement type" {
        In => "IN",
        Out => "OUT",
        Adjustment => "ADJUSTMENT",
    }
}

label_enum! {
    /// What caused a stock movement.
    ReferenceType: "reference type" {
        Sale => "SALE",
        Purchase => "PURCHASE",
        Adjustment => "ADJUSTMENT",
        Return => "RETURN",
    }
}

label_enum! {
    /// How a setting value should be interpreted.
    SettingType: "setting type" {
        String => "STRING",
        Number => "NUMBER",
        Boolean => "BOOLEAN",
        Json => "JSON",
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Employee
    }
}

impl Default for CustomerType {
    fn default() -> Self {
        CustomerType::Individual
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Paid
    }
}

impl Default for SettingType {
    fn default() -> Self {
        SettingType::String
    }
}

fn label<T: FromStr<Err = CoreError>>(row: &Row, column: &str) -> CoreResult<T> {
    row.get_str(column)?.parse()
}

fn cents(row: &Row, column: &str) -> CoreResult<Money> {
    row.get_i64(column).map(Money::from_cents)
}

// =============================================================================
// User
// =============================================================================

/// An application login.
///
/// `password_hash` is an argon2 PHC string; plaintext is never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl User {
    /// "First Last", falling back to the username.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            _ => self.username.clone(),
        }
    }
}

impl FromRow for User {
    fn from_row(row: &Row) -> CoreResult<Self> {
        Ok(User {
            id: row.get_i64("id")?,
            username: row.get_string("username")?,
            password_hash: row.get_string("password_hash")?,
            email: row.get_string("email")?,
            role: label(row, "role")?,
            first_name: row.get_opt_string("first_name")?,
            last_name: row.get_opt_string("last_name")?,
            phone: row.get_opt_string("phone")?,
            is_active: row.get_bool("is_active")?,
            created_at: row.get_datetime("created_at")?,
        })
    }
}

/// Input for creating a user. The password is hashed before storage.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

impl FromRow for Category {
    fn from_row(row: &Row) -> CoreResult<Self> {
        Ok(Category {
            id: row.get_i64("id")?,
            name: row.get_string("name")?,
            description: row.get_opt_string("description")?,
            is_active: row.get_bool("is_active")?,
        })
    }
}

// =============================================================================
// Product
// =============================================================================

/// A stocked product.
///
/// `category` and `supplier` hold names, not foreign keys, so products stay
/// readable after a category or supplier is removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Stock Keeping Unit, unique per product.
    pub sku: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub purchase_price: Money,
    pub selling_price: Money,
    pub stock_quantity: i64,
    /// Reorder point shown on the inventory view.
    pub min_stock_level: i64,
    pub unit: String,
    pub supplier: Option<String>,
    pub barcode: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.min_stock_level
    }

    /// Stock valued at purchase price.
    pub fn stock_value(&self) -> Money {
        self.purchase_price * self.stock_quantity
    }
}

impl FromRow for Product {
    fn from_row(row: &Row) -> CoreResult<Self> {
        Ok(Product {
            id: row.get_i64("id")?,
            name: row.get_string("name")?,
            sku: row.get_string("sku")?,
            category: row.get_opt_string("category")?,
            description: row.get_opt_string("description")?,
            purchase_price: cents(row, "purchase_price_cents")?,
            selling_price: cents(row, "selling_price_cents")?,
            stock_quantity: row.get_i64("stock_quantity")?,
            min_stock_level: row.get_i64("min_stock_level")?,
            unit: row.get_string("unit")?,
            supplier: row.get_opt_string("supplier")?,
            barcode: row.get_opt_string("barcode")?,
            is_active: row.get_bool("is_active")?,
            created_at: row.get_datetime("created_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub purchase_price: Money,
    pub selling_price: Money,
    pub stock_quantity: i64,
    pub min_stock_level: i64,
    pub unit: String,
    pub supplier: Option<String>,
    pub barcode: Option<String>,
}

// =============================================================================
// Customer
// =============================================================================

/// A customer. Business customers use `name` for the company name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub customer_type: CustomerType,
    pub credit_limit: Money,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl FromRow for Customer {
    fn from_row(row: &Row) -> CoreResult<Self> {
        Ok(Customer {
            id: row.get_i64("id")?,
            name: row.get_string("name")?,
            email: row.get_opt_string("email")?,
            phone: row.get_opt_string("phone")?,
            address: row.get_opt_string("address")?,
            city: row.get_opt_string("city")?,
            state: row.get_opt_string("state")?,
            pincode: row.get_opt_string("pincode")?,
            customer_type: label(row, "customer_type")?,
            credit_limit: cents(row, "credit_limit_cents")?,
            notes: row.get_opt_string("notes")?,
            is_active: row.get_bool("is_active")?,
            created_at: row.get_datetime("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewCustomer {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub customer_type: CustomerType,
    pub credit_limit: Money,
    pub notes: Option<String>,
}

// =============================================================================
// Supplier
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    /// Free text such as "Net 30".
    pub payment_terms: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl FromRow for Supplier {
    fn from_row(row: &Row) -> CoreResult<Self> {
        Ok(Supplier {
            id: row.get_i64("id")?,
            name: row.get_string("name")?,
            contact_person: row.get_opt_string("contact_person")?,
            email: row.get_opt_string("email")?,
            phone: row.get_opt_string("phone")?,
            address: row.get_opt_string("address")?,
            city: row.get_opt_string("city")?,
            state: row.get_opt_string("state")?,
            pincode: row.get_opt_string("pincode")?,
            payment_terms: row.get_opt_string("payment_terms")?,
            notes: row.get_opt_string("notes")?,
            is_active: row.get_bool("is_active")?,
            created_at: row.get_datetime("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewSupplier {
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub payment_terms: Option<String>,
    pub notes: Option<String>,
}

// =============================================================================
// Sale
// =============================================================================

/// One sale line. Customer and product names are denormalized so history
/// survives deletion of either (`ON DELETE SET NULL`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    /// `INV-000001` style number.
    pub invoice_number: String,
    pub customer_id: Option<i64>,
    pub customer_name: Option<String>,
    pub product_id: Option<i64>,
    pub product_name: Option<String>,
    pub quantity: i64,
    pub unit_price: Money,
    /// Quantity × unit price, less discount, plus tax.
    pub total_amount: Money,
    pub discount_amount: Money,
    pub tax_amount: Money,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

impl FromRow for Sale {
    fn from_row(row: &Row) -> CoreResult<Self> {
        Ok(Sale {
            id: row.get_i64("id")?,
            invoice_number: row.get_string("invoice_number")?,
            customer_id: row.get_opt_i64("customer_id")?,
            customer_name: row.get_opt_string("customer_name")?,
            product_id: row.get_opt_i64("product_id")?,
            product_name: row.get_opt_string("product_name")?,
            quantity: row.get_i64("quantity")?,
            unit_price: cents(row, "unit_price_cents")?,
            total_amount: cents(row, "total_amount_cents")?,
            discount_amount: cents(row, "discount_amount_cents")?,
            tax_amount: cents(row, "tax_amount_cents")?,
            payment_method: label(row, "payment_method")?,
            payment_status: label(row, "payment_status")?,
            notes: row.get_opt_string("notes")?,
            created_at: row.get_datetime("created_at")?,
        })
    }
}

/// Input for recording a sale.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    pub customer_id: Option<i64>,
    pub product_id: i64,
    pub quantity: i64,
    /// Defaults to the product's selling price.
    pub unit_price: Option<Money>,
    pub discount: Money,
    /// Defaults to the business rules' tax rate.
    pub tax_rate: Option<TaxRate>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
}

impl NewSale {
    /// A cash, paid sale at list price with no discount.
    pub fn new(product_id: i64, quantity: i64) -> Self {
        NewSale {
            customer_id: None,
            product_id,
            quantity,
            unit_price: None,
            discount: Money::zero(),
            tax_rate: None,
            payment_method: PaymentMethod::default(),
            payment_status: PaymentStatus::default(),
            notes: None,
        }
    }

    pub fn customer(mut self, customer_id: i64) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = method;
        self
    }
}

/// Money breakdown of one sale line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

impl SaleTotals {
    /// Subtotal = unit × qty; tax applies after the discount.
    ///
    /// ```rust
    /// use ssms_core::{Money, SaleTotals, TaxRate};
    ///
    /// let t = SaleTotals::compute(Money::from_cents(50_000), 10, Money::from_cents(5_000), TaxRate::from_bps(1800));
    /// assert_eq!(t.subtotal.cents(), 500_000);
    /// assert_eq!(t.tax.cents(), 89_100);
    /// assert_eq!(t.total.cents(), 584_100);
    /// ```
    pub fn compute(unit_price: Money, quantity: i64, discount: Money, rate: TaxRate) -> Self {
        let subtotal = unit_price * quantity;
        let taxable = subtotal - discount;
        let tax = taxable.calculate_tax(rate);
        SaleTotals {
            subtotal,
            discount,
            tax,
            total: taxable + tax,
        }
    }
}

// =============================================================================
// Purchase
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: i64,
    /// `PUR-000001` style number.
    pub purchase_number: String,
    pub supplier_name: String,
    pub product_id: Option<i64>,
    pub product_name: Option<String>,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_amount: Money,
    pub purchase_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

impl FromRow for Purchase {
    fn from_row(row: &Row) -> CoreResult<Self> {
        Ok(Purchase {
            id: row.get_i64("id")?,
            purchase_number: row.get_string("purchase_number")?,
            supplier_name: row.get_string("supplier_name")?,
            product_id: row.get_opt_i64("product_id")?,
            product_name: row.get_opt_string("product_name")?,
            quantity: row.get_i64("quantity")?,
            unit_price: cents(row, "unit_price_cents")?,
            total_amount: cents(row, "total_amount_cents")?,
            purchase_date: row.get_date("purchase_date")?,
            payment_method: label(row, "payment_method")?,
            payment_status: label(row, "payment_status")?,
            notes: row.get_opt_string("notes")?,
            created_at: row.get_datetime("created_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPurchase {
    pub supplier_name: String,
    /// When set, stock is received into this product.
    pub product_id: Option<i64>,
    pub product_name: Option<String>,
    pub quantity: i64,
    pub unit_price: Money,
    pub purchase_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
}

// =============================================================================
// Stock Movement
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: i64,
    pub product_id: i64,
    pub movement_type: MovementType,
    /// Always positive; direction comes from `movement_type`.
    pub quantity: i64,
    pub reference_type: ReferenceType,
    pub reference_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

impl FromRow for StockMovement {
    fn from_row(row: &Row) -> CoreResult<Self> {
        Ok(StockMovement {
            id: row.get_i64("id")?,
            product_id: row.get_i64("product_id")?,
            movement_type: label(row, "movement_type")?,
            quantity: row.get_i64("quantity")?,
            reference_type: label(row, "reference_type")?,
            reference_id: row.get_opt_i64("reference_id")?,
            notes: row.get_opt_string("notes")?,
            created_at: row.get_datetime("created_at")?,
        })
    }
}

// =============================================================================
// Audit Log
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: String,
    pub table_name: Option<String>,
    pub record_id: Option<i64>,
    /// JSON text.
    pub old_values: Option<String>,
    pub new_values: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: NaiveDateTime,
}

impl FromRow for AuditLogEntry {
    fn from_row(row: &Row) -> CoreResult<Self> {
        Ok(AuditLogEntry {
            id: row.get_i64("id")?,
            user_id: row.get_opt_i64("user_id")?,
            action: row.get_string("action")?,
            table_name: row.get_opt_string("table_name")?,
            record_id: row.get_opt_i64("record_id")?,
            old_values: row.get_opt_string("old_values")?,
            new_values: row.get_opt_string("new_values")?,
            ip_address: row.get_opt_string("ip_address")?,
            user_agent: row.get_opt_string("user_agent")?,
            created_at: row.get_datetime("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewAuditEntry {
    pub user_id: Option<i64>,
    pub action: String,
    pub table_name: Option<String>,
    pub record_id: Option<i64>,
    pub old_values: Option<serde_json::Value>,
    pub new_values: Option<serde_json::Value>,
}

impl NewAuditEntry {
    pub fn new(action: impl Into<String>) -> Self {
        NewAuditEntry {
            action: action.into(),
            ..Default::default()
        }
    }

    pub fn on(mut self, table_name: impl Into<String>, record_id: i64) -> Self {
        self.table_name = Some(table_name.into());
        self.record_id = Some(record_id);
        self
    }

    pub fn by(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

// =============================================================================
// Setting
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: Option<String>,
    pub setting_type: SettingType,
    pub description: Option<String>,
}

impl Setting {
    /// `BOOLEAN` settings: "true"/"1"/"yes" are true.
    pub fn as_bool(&self) -> Option<bool> {
        match self.value.as_deref()?.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.value.as_deref()?.trim().parse().ok()
    }
}

impl FromRow for Setting {
    fn from_row(row: &Row) -> CoreResult<Self> {
        Ok(Setting {
            key: row.get_string("setting_key")?,
            value: row.get_opt_string("setting_value")?,
            setting_type: label(row, "setting_type")?,
            description: row.get_opt_string("description")?,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
