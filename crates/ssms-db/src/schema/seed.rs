//! Starter data, applied with insert-if-absent statements.
//!
//! Each statement collides on a natural unique key (username, category
//! name, SKU, customer email, supplier name, invoice number, setting key)
//! when its row already exists, so re-running inserts nothing.

use ssms_core::{params, BusinessRules, CustomerType, Money, Params, PaymentMethod, PaymentStatus, Role, SettingType};

use crate::config::Backend;

/// One seed statement and its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedStatement {
    /// Step name reported on failure, e.g. `seed product LAP001`.
    pub step: String,
    pub sql: String,
    pub params: Params,
}

const CATEGORIES: &[(&str, &str)] = &[
    ("Electronics", "Electronic devices and accessories"),
    ("Clothing", "Apparel and fashion items"),
    ("Food & Beverages", "Food and drink products"),
    ("Books", "Books and educational materials"),
    ("Home & Garden", "Home improvement and garden supplies"),
    ("Sports", "Sports equipment and accessories"),
];

struct SeedProduct {
    name: &'static str,
    sku: &'static str,
    category: &'static str,
    description: &'static str,
    purchase_price: Money,
    selling_price: Money,
    stock: i64,
    min_stock: i64,
    unit: &'static str,
    supplier: &'static str,
}

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Laptop",
        sku: "LAP001",
        category: "Electronics",
        description: "High-performance laptop",
        purchase_price: Money::from_cents(5_000_000),
        selling_price: Money::from_cents(6_500_000),
        stock: 10,
        min_stock: 2,
        unit: "Pieces",
        supplier: "Tech Supplier",
    },
    SeedProduct {
        name: "T-Shirt",
        sku: "TSH001",
        category: "Clothing",
        description: "Cotton t-shirt",
        purchase_price: Money::from_cents(20_000),
        selling_price: Money::from_cents(50_000),
        stock: 50,
        min_stock: 10,
        unit: "Pieces",
        supplier: "Fashion Supplier",
    },
    SeedProduct {
        name: "Coffee",
        sku: "COF001",
        category: "Food & Beverages",
        description: "Premium coffee beans",
        purchase_price: Money::from_cents(30_000),
        selling_price: Money::from_cents(45_000),
        stock: 25,
        min_stock: 5,
        unit: "Kg",
        supplier: "Food Supplier",
    },
    SeedProduct {
        name: "Python Book",
        sku: "BOK001",
        category: "Books",
        description: "Python programming guide",
        purchase_price: Money::from_cents(40_000),
        selling_price: Money::from_cents(60_000),
        stock: 15,
        min_stock: 3,
        unit: "Pieces",
        supplier: "Book Supplier",
    },
    SeedProduct {
        name: "Garden Tools",
        sku: "GAR001",
        category: "Home & Garden",
        description: "Complete garden tool set",
        purchase_price: Money::from_cents(150_000),
        selling_price: Money::from_cents(200_000),
        stock: 8,
        min_stock: 2,
        unit: "Set",
        supplier: "Garden Supplier",
    },
];

// (name, email, phone, address, city, state, pincode, type, credit limit)
const CUSTOMERS: &[(&str, &str, &str, &str, &str, &str, &str, CustomerType, Money)] = &[
    (
        "John Doe",
        "john@example.com",
        "9876543210",
        "123 Main St",
        "Mumbai",
        "Maharashtra",
        "400001",
        CustomerType::Individual,
        Money::from_cents(1_000_000),
    ),
    (
        "ABC Company",
        "contact@abc.com",
        "9876543211",
        "456 Business Ave",
        "Delhi",
        "Delhi",
        "110001",
        CustomerType::Business,
        Money::from_cents(5_000_000),
    ),
    (
        "Jane Smith",
        "jane@example.com",
        "9876543212",
        "789 Residential Rd",
        "Bangalore",
        "Karnataka",
        "560001",
        CustomerType::Individual,
        Money::from_cents(500_000),
    ),
];

// (name, contact, email, phone, address, city, state, pincode, terms)
const SUPPLIERS: &[(&str, &str, &str, &str, &str, &str, &str, &str, &str)] = &[
    (
        "Tech Supplier",
        "Raj Kumar",
        "raj@techsupplier.com",
        "9876543213",
        "Tech Park",
        "Mumbai",
        "Maharashtra",
        "400002",
        "Net 30",
    ),
    (
        "Fashion Supplier",
        "Priya Singh",
        "priya@fashionsupplier.com",
        "9876543214",
        "Fashion District",
        "Delhi",
        "Delhi",
        "110002",
        "Net 15",
    ),
    (
        "Food Supplier",
        "Amit Patel",
        "amit@foodsupplier.com",
        "9876543215",
        "Food Market",
        "Bangalore",
        "Karnataka",
        "560002",
        "Net 7",
    ),
];

// (customer email, product sku, quantity, unit price, method)
const SALES: &[(&str, &str, i64, Money, PaymentMethod)] = &[
    ("john@example.com", "LAP001", 1, Money::from_cents(6_500_000), PaymentMethod::Card),
    ("contact@abc.com", "TSH001", 10, Money::from_cents(50_000), PaymentMethod::BankTransfer),
    ("jane@example.com", "COF001", 2, Money::from_cents(45_000), PaymentMethod::Upi),
];

const SETTINGS: &[(&str, &str, SettingType, &str)] = &[
    ("company_name", "SSMS Solutions", SettingType::String, "Company name"),
    ("currency", "₹", SettingType::String, "Default currency symbol"),
    ("timezone", "Asia/Kolkata", SettingType::String, "Default timezone"),
    ("date_format", "DD/MM/YYYY", SettingType::String, "Date display format"),
    ("auto_backup", "true", SettingType::Boolean, "Enable automatic backup"),
    ("session_timeout", "30", SettingType::Number, "Session timeout in minutes"),
];

/// Username of the seeded administrator.
pub const ADMIN_USERNAME: &str = "admin";

/// Seed statements in application order.
///
/// The admin user is included only when `admin_password_hash` is given.
pub fn seed_statements(backend: Backend, admin_password_hash: Option<&str>) -> Vec<SeedStatement> {
    let insert = backend.insert_ignore();
    let rules = BusinessRules::default();
    let mut out = Vec::new();

    if let Some(hash) = admin_password_hash {
        out.push(SeedStatement {
            step: "seed admin user".to_string(),
            sql: format!(
                "{insert} INTO users (username, password_hash, email, role, first_name, last_name, is_active) \
                 VALUES (?, ?, ?, ?, ?, ?, 1)"
            ),
            params: params![ADMIN_USERNAME, hash, "admin@ssms.com", Role::Admin, "System", "Administrator"],
        });
    }

    for (name, description) in CATEGORIES {
        out.push(SeedStatement {
            step: format!("seed category {}", name),
            sql: format!("{insert} INTO categories (name, description) VALUES (?, ?)"),
            params: params![*name, *description],
        });
    }

    for p in PRODUCTS {
        out.push(SeedStatement {
            step: format!("seed product {}", p.sku),
            sql: format!(
                "{insert} INTO products (name, sku, category, description, purchase_price_cents, \
                 selling_price_cents, stock_quantity, min_stock_level, unit, supplier) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
            ),
            params: params![
                p.name,
                p.sku,
                p.category,
                p.description,
                p.purchase_price,
                p.selling_price,
                p.stock,
                p.min_stock,
                p.unit,
                p.supplier
            ],
        });
    }

    for (name, email, phone, address, city, state, pincode, kind, credit) in CUSTOMERS {
        out.push(SeedStatement {
            step: format!("seed customer {}", email),
            sql: format!(
                "{insert} INTO customers (name, email, phone, address, city, state, pincode, \
                 customer_type, credit_limit_cents) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
            ),
            params: params![*name, *email, *phone, *address, *city, *state, *pincode, *kind, *credit],
        });
    }

    for (name, contact, email, phone, address, city, state, pincode, terms) in SUPPLIERS {
        out.push(SeedStatement {
            step: format!("seed supplier {}", name),
            sql: format!(
                "{insert} INTO suppliers (name, contact_person, email, phone, address, city, state, \
                 pincode, payment_terms) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
            ),
            params: params![*name, *contact, *email, *phone, *address, *city, *state, *pincode, *terms],
        });
    }

    // Customer and product ids are looked up, not assumed.
    for (seq, (email, sku, quantity, unit_price, method)) in SALES.iter().enumerate() {
        let invoice = rules.invoice_number(seq as i64 + 1);
        out.push(SeedStatement {
            step: format!("seed sale {}", invoice),
            sql: format!(
                "{insert} INTO sales (invoice_number, customer_id, customer_name, product_id, \
                 product_name, quantity, unit_price_cents, total_amount_cents, payment_method, \
                 payment_status) \
                 SELECT ?, c.id, c.name, p.id, p.name, ?, ?, ?, ?, ? \
                 FROM customers c, products p WHERE c.email = ? AND p.sku = ?"
            ),
            params: params![
                invoice,
                *quantity,
                *unit_price,
                *unit_price * *quantity,
                *method,
                PaymentStatus::Paid,
                *email,
                *sku
            ],
        });
    }

    for (key, value, kind, description) in SETTINGS {
        out.push(SeedStatement {
            step: format!("seed setting {}", key),
            sql: format!(
                "{insert} INTO settings (setting_key, setting_value, setting_type, description) \
                 VALUES (?, ?, ?, ?)"
            ),
            params: params![*key, *value, *kind, *description],
        });
    }

    out
}
