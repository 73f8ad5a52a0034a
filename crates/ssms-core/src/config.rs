//! # Business Configuration
//!
//! Static application constants: document numbering, tax and stock defaults,
//! display formats and the password policy.
//!
//! Database connection parameters are not here; they belong to `ssms-db`,
//! which reads them from the environment.

use serde::{Deserialize, Serialize};

use crate::money::{Money, TaxRate};

/// Application identity shown in window titles and the CLI banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub author: &'static str,
}

pub const APP_INFO: AppInfo = AppInfo {
    name: "Sales & Stock Management System",
    version: env!("CARGO_PKG_VERSION"),
    author: "SSMS Team",
};

// =============================================================================
// Business Rules
// =============================================================================

/// Numbering prefixes, defaults and formats used by sales and purchases.
///
/// ## Example
/// ```rust
/// use ssms_core::BusinessRules;
///
/// let rules = BusinessRules::default();
/// assert_eq!(rules.invoice_number(1), "INV-000001");
/// assert_eq!(rules.purchase_number(42), "PUR-000042");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessRules {
    pub invoice_prefix: String,
    pub purchase_prefix: String,
    pub credit_note_prefix: String,
    pub debit_note_prefix: String,
    pub default_tax_rate: TaxRate,
    /// Products at or below this quantity show on the dashboard alert.
    pub low_stock_threshold: i64,
    pub currency_symbol: String,
    /// chrono format strings.
    pub date_format: String,
    pub datetime_format: String,
}

impl Default for BusinessRules {
    fn default() -> Self {
        BusinessRules {
            invoice_prefix: "INV".to_string(),
            purchase_prefix: "PUR".to_string(),
            credit_note_prefix: "CN".to_string(),
            debit_note_prefix: "DN".to_string(),
            default_tax_rate: TaxRate::zero(),
            low_stock_threshold: 10,
            currency_symbol: "$".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            datetime_format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }
}

impl BusinessRules {
    pub fn invoice_number(&self, seq: i64) -> String {
        document_number(&self.invoice_prefix, seq)
    }

    pub fn purchase_number(&self, seq: i64) -> String {
        document_number(&self.purchase_prefix, seq)
    }

    pub fn credit_note_number(&self, seq: i64) -> String {
        document_number(&self.credit_note_prefix, seq)
    }

    pub fn debit_note_number(&self, seq: i64) -> String {
        document_number(&self.debit_note_prefix, seq)
    }

    /// Sequence part of a number with this prefix, e.g. `INV-000012` → 12.
    pub fn parse_sequence(prefix: &str, number: &str) -> Option<i64> {
        number
            .strip_prefix(prefix)?
            .strip_prefix('-')?
            .parse()
            .ok()
    }

    pub fn format_money(&self, amount: Money) -> String {
        amount.format_with(&self.currency_symbol)
    }
}

fn document_number(prefix: &str, seq: i64) -> String {
    format!("{}-{:06}", prefix, seq)
}

// =============================================================================
// Security Policy
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityPolicy {
    pub password_min_length: usize,
    pub password_require_special: bool,
    pub audit_logging: bool,
    pub max_login_attempts: u32,
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        SecurityPolicy {
            password_min_length: 6,
            password_require_special: false,
            audit_logging: true,
            max_login_attempts: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_numbers() {
        let rules = BusinessRules::default();
        assert_eq!(rules.invoice_number(3), "INV-000003");
        assert_eq!(rules.credit_note_number(7), "CN-000007");
        assert_eq!(rules.debit_note_number(1_234_567), "DN-1234567");
    }

    #[test]
    fn test_parse_sequence() {
        assert_eq!(BusinessRules::parse_sequence("INV", "INV-000012"), Some(12));
        assert_eq!(BusinessRules::parse_sequence("INV", "PUR-000012"), None);
        assert_eq!(BusinessRules::parse_sequence("INV", "INV000012"), None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let rules: BusinessRules =
            serde_json::from_str(r#"{"currency_symbol": "₹", "low_stock_threshold": 5}"#).unwrap();
        assert_eq!(rules.currency_symbol, "₹");
        assert_eq!(rules.low_stock_threshold, 5);
        assert_eq!(rules.invoice_prefix, "INV");
        assert_eq!(rules.format_money(Money::from_cents(45_000)), "₹450.00");
    }
}
