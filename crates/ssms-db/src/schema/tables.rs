//! Table definitions, in creation order.
//!
//! Money is stored as integer cents in every dialect. Enumerated columns
//! are `ENUM` on MySQL and `TEXT` with a `CHECK` on SQLite; both accept
//! exactly the labels the `ssms_core` enums produce.

use crate::config::Backend;

/// One table in both dialects.
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    mysql: &'static str,
    sqlite: &'static str,
}

impl TableDef {
    pub fn create_sql(&self, backend: Backend) -> &'static str {
        match backend {
            Backend::MySql => self.mysql,
            Backend::Sqlite => self.sqlite,
        }
    }
}

/// Referenced tables come before the tables that reference them.
pub const TABLES: &[TableDef] = &[
    TableDef {
        name: "users",
        mysql: "CREATE TABLE IF NOT EXISTS users (
            id INT AUTO_INCREMENT PRIMARY KEY,
            username VARCHAR(50) NOT NULL UNIQUE,
            password_hash VARCHAR(255) NOT NULL,
            email VARCHAR(100) NOT NULL UNIQUE,
            role ENUM('Admin', 'Manager', 'Employee') NOT NULL DEFAULT 'Employee',
            first_name VARCHAR(50),
            last_name VARCHAR(50),
            phone VARCHAR(20),
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4",
        sqlite: "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            role TEXT NOT NULL DEFAULT 'Employee'
                CHECK (role IN ('Admin', 'Manager', 'Employee')),
            first_name TEXT,
            last_name TEXT,
            phone TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    },
    TableDef {
        name: "customers",
        mysql: "CREATE TABLE IF NOT EXISTS customers (
            id INT AUTO_INCREMENT PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            email VARCHAR(100) UNIQUE,
            phone VARCHAR(20),
            address TEXT,
            city VARCHAR(50),
            state VARCHAR(50),
            pincode VARCHAR(10),
            customer_type ENUM('Individual', 'Business', 'Wholesale', 'Retail')
                NOT NULL DEFAULT 'Individual',
            credit_limit_cents BIGINT NOT NULL DEFAULT 0,
            notes TEXT,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4",
        sqlite: "CREATE TABLE IF NOT EXISTS customers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT UNIQUE,
            phone TEXT,
            address TEXT,
            city TEXT,
            state TEXT,
            pincode TEXT,
            customer_type TEXT NOT NULL DEFAULT 'Individual'
                CHECK (customer_type IN ('Individual', 'Business', 'Wholesale', 'Retail')),
            credit_limit_cents INTEGER NOT NULL DEFAULT 0,
            notes TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    },
    TableDef {
        name: "categories",
        mysql: "CREATE TABLE IF NOT EXISTS categories (
            id INT AUTO_INCREMENT PRIMARY KEY,
            name VARCHAR(50) NOT NULL UNIQUE,
            description TEXT,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4",
        sqlite: "CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    },
    TableDef {
        name: "products",
        mysql: "CREATE TABLE IF NOT EXISTS products (
            id INT AUTO_INCREMENT PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            sku VARCHAR(50) NOT NULL UNIQUE,
            category VARCHAR(50),
            description TEXT,
            purchase_price_cents BIGINT NOT NULL DEFAULT 0,
            selling_price_cents BIGINT NOT NULL DEFAULT 0,
            stock_quantity INT NOT NULL DEFAULT 0,
            min_stock_level INT NOT NULL DEFAULT 0,
            unit VARCHAR(20) NOT NULL DEFAULT 'Pieces',
            supplier VARCHAR(100),
            barcode VARCHAR(50),
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
            INDEX idx_products_barcode (barcode)
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4",
        sqlite: "CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            sku TEXT NOT NULL UNIQUE,
            category TEXT,
            description TEXT,
            purchase_price_cents INTEGER NOT NULL DEFAULT 0,
            selling_price_cents INTEGER NOT NULL DEFAULT 0,
            stock_quantity INTEGER NOT NULL DEFAULT 0,
            min_stock_level INTEGER NOT NULL DEFAULT 0,
            unit TEXT NOT NULL DEFAULT 'Pieces',
            supplier TEXT,
            barcode TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    },
    TableDef {
        name: "sales",
        mysql: "CREATE TABLE IF NOT EXISTS sales (
            id INT AUTO_INCREMENT PRIMARY KEY,
            invoice_number VARCHAR(30) NOT NULL UNIQUE,
            customer_id INT,
            customer_name VARCHAR(100),
            product_id INT,
            product_name VARCHAR(100),
            quantity INT NOT NULL,
            unit_price_cents BIGINT NOT NULL,
            total_amount_cents BIGINT NOT NULL,
            discount_amount_cents BIGINT NOT NULL DEFAULT 0,
            tax_amount_cents BIGINT NOT NULL DEFAULT 0,
            payment_method ENUM('Cash', 'Card', 'UPI', 'Bank Transfer', 'Cheque')
                NOT NULL DEFAULT 'Cash',
            payment_status ENUM('Pending', 'Paid', 'Partially Paid', 'Refunded')
                NOT NULL DEFAULT 'Paid',
            notes TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
            FOREIGN KEY (customer_id) REFERENCES customers(id) ON DELETE SET NULL,
            FOREIGN KEY (product_id) REFERENCES products(id) ON DELETE SET NULL
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4",
        sqlite: "CREATE TABLE IF NOT EXISTS sales (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            invoice_number TEXT NOT NULL UNIQUE,
            customer_id INTEGER REFERENCES customers(id) ON DELETE SET NULL,
            customer_name TEXT,
            product_id INTEGER REFERENCES products(id) ON DELETE SET NULL,
            product_name TEXT,
            quantity INTEGER NOT NULL,
            unit_price_cents INTEGER NOT NULL,
            total_amount_cents INTEGER NOT NULL,
            discount_amount_cents INTEGER NOT NULL DEFAULT 0,
            tax_amount_cents INTEGER NOT NULL DEFAULT 0,
            payment_method TEXT NOT NULL DEFAULT 'Cash'
                CHECK (payment_method IN ('Cash', 'Card', 'UPI', 'Bank Transfer', 'Cheque')),
            payment_status TEXT NOT NULL DEFAULT 'Paid'
                CHECK (payment_status IN ('Pending', 'Paid', 'Partially Paid', 'Refunded')),
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    },
    TableDef {
        name: "purchases",
        mysql: "CREATE TABLE IF NOT EXISTS purchases (
            id INT AUTO_INCREMENT PRIMARY KEY,
            purchase_number VARCHAR(30) NOT NULL UNIQUE,
            supplier_name VARCHAR(100) NOT NULL,
            product_id INT,
            product_name VARCHAR(100),
            quantity INT NOT NULL,
            unit_price_cents BIGINT NOT NULL,
            total_amount_cents BIGINT NOT NULL,
            purchase_date DATE NOT NULL,
            payment_method ENUM('Cash', 'Card', 'Bank Transfer', 'Cheque')
                NOT NULL DEFAULT 'Bank Transfer',
            payment_status ENUM('Pending', 'Paid', 'Partially Paid')
                NOT NULL DEFAULT 'Pending',
            notes TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
            FOREIGN KEY (product_id) REFERENCES products(id) ON DELETE SET NULL
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4",
        sqlite: "CREATE TABLE IF NOT EXISTS purchases (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            purchase_number TEXT NOT NULL UNIQUE,
            supplier_name TEXT NOT NULL,
            product_id INTEGER REFERENCES products(id) ON DELETE SET NULL,
            product_name TEXT,
            quantity INTEGER NOT NULL,
            unit_price_cents INTEGER NOT NULL,
            total_amount_cents INTEGER NOT NULL,
            purchase_date TEXT NOT NULL,
            payment_method TEXT NOT NULL DEFAULT 'Bank Transfer'
                CHECK (payment_method IN ('Cash', 'Card', 'Bank Transfer', 'Cheque')),
            payment_status TEXT NOT NULL DEFAULT 'Pending'
                CHECK (payment_status IN ('Pending', 'Paid', 'Partially Paid')),
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    },
    TableDef {
        name: "stock_movements",
        mysql: "CREATE TABLE IF NOT EXISTS stock_movements (
            id INT AUTO_INCREMENT PRIMARY KEY,
            product_id INT NOT NULL,
            movement_type ENUM('IN', 'OUT', 'ADJUSTMENT') NOT NULL,
            quantity INT NOT NULL,
            reference_type ENUM('SALE', 'PURCHASE', 'ADJUSTMENT', 'RETURN') NOT NULL,
            reference_id INT,
            notes TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (product_id) REFERENCES products(id) ON DELETE CASCADE
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4",
        sqlite: "CREATE TABLE IF NOT EXISTS stock_movements (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            movement_type TEXT NOT NULL
                CHECK (movement_type IN ('IN', 'OUT', 'ADJUSTMENT')),
            quantity INTEGER NOT NULL,
            reference_type TEXT NOT NULL
                CHECK (reference_type IN ('SALE', 'PURCHASE', 'ADJUSTMENT', 'RETURN')),
            reference_id INTEGER,
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    },
    TableDef {
        name: "suppliers",
        mysql: "CREATE TABLE IF NOT EXISTS suppliers (
            id INT AUTO_INCREMENT PRIMARY KEY,
            name VARCHAR(100) NOT NULL UNIQUE,
            contact_person VARCHAR(50),
            email VARCHAR(100),
            phone VARCHAR(20),
            address TEXT,
            city VARCHAR(50),
            state VARCHAR(50),
            pincode VARCHAR(10),
            payment_terms VARCHAR(100),
            notes TEXT,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4",
        sqlite: "CREATE TABLE IF NOT EXISTS suppliers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            contact_person TEXT,
            email TEXT,
            phone TEXT,
            address TEXT,
            city TEXT,
            state TEXT,
            pincode TEXT,
            payment_terms TEXT,
            notes TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    },
    TableDef {
        name: "audit_log",
        mysql: "CREATE TABLE IF NOT EXISTS audit_log (
            id INT AUTO_INCREMENT PRIMARY KEY,
            user_id INT,
            action VARCHAR(100) NOT NULL,
            table_name VARCHAR(50),
            record_id INT,
            old_values JSON,
            new_values JSON,
            ip_address VARCHAR(45),
            user_agent TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE SET NULL
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4",
        sqlite: "CREATE TABLE IF NOT EXISTS audit_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
            action TEXT NOT NULL,
            table_name TEXT,
            record_id INTEGER,
            old_values TEXT,
            new_values TEXT,
            ip_address TEXT,
            user_agent TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    },
    TableDef {
        name: "settings",
        mysql: "CREATE TABLE IF NOT EXISTS settings (
            id INT AUTO_INCREMENT PRIMARY KEY,
            setting_key VARCHAR(100) NOT NULL UNIQUE,
            setting_value TEXT,
            setting_type ENUM('STRING', 'NUMBER', 'BOOLEAN', 'JSON') NOT NULL DEFAULT 'STRING',
            description TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4",
        sqlite: "CREATE TABLE IF NOT EXISTS settings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            setting_key TEXT NOT NULL UNIQUE,
            setting_value TEXT,
            setting_type TEXT NOT NULL DEFAULT 'STRING'
                CHECK (setting_type IN ('STRING', 'NUMBER', 'BOOLEAN', 'JSON')),
            description TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    },
];
