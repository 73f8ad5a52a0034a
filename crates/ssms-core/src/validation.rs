//! # Validation Module
//!
//! Input checks run by repositories before a statement is built.
//!
//! ```text
//! form input ──► validate_* (this module) ──► Params ──► Session
//!                      │
//!                      └── ValidationError → CoreError → DbError (Statement)
//! ```
//!
//! The schema's NOT NULL / UNIQUE / FOREIGN KEY constraints still apply
//! underneath; these checks just fail earlier with a readable message.
//!
//! ## Usage
//! ```rust
//! use ssms_core::validation::{validate_sku, validate_quantity};
//!
//! validate_sku("LAP001").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use chrono::NaiveDate;

use crate::config::SecurityPolicy;
use crate::error::ValidationError;

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Upper bound on a single sale or purchase line.
pub const MAX_LINE_QUANTITY: i64 = 100_000;

fn required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.trim().chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// SKU: 1-50 characters of letters, digits, `-` and `_`.
///
/// ```rust
/// use ssms_core::validation::validate_sku;
///
/// assert!(validate_sku("GAR001").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("GAR 001").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    required("sku", sku)?;
    max_len("sku", sku, 50)?;

    if !sku
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "only letters, digits, '-' and '_' are allowed".to_string(),
        });
    }

    Ok(())
}

/// Names for products, customers, suppliers and categories (1-100 chars).
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    required(field, name)?;
    max_len(field, name, 100)
}

/// Optional email: when present it needs a local part, `@` and a dotted
/// domain.
pub fn validate_email(email: Option<&str>) -> ValidationResult<()> {
    let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(());
    };
    max_len("email", email, 100)?;

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected name@domain.tld".to_string(),
        });
    }
    Ok(())
}

/// Optional phone: 7-20 characters of digits, spaces, `+`, `-`, `(`, `)`.
pub fn validate_phone(phone: Option<&str>) -> ValidationResult<()> {
    let Some(phone) = phone.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(());
    };
    max_len("phone", phone, 20)?;

    let digits = phone.chars().filter(char::is_ascii_digit).count();
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'));
    if !allowed || digits < 7 {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "expected at least 7 digits".to_string(),
        });
    }
    Ok(())
}

/// Username: 3-50 characters, no whitespace.
pub fn validate_username(username: &str) -> ValidationResult<()> {
    required("username", username)?;
    let username = username.trim();
    if username.chars().count() < 3 {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: 3,
        });
    }
    max_len("username", username, 50)?;
    if username.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must not contain spaces".to_string(),
        });
    }
    Ok(())
}

/// Password against a [`SecurityPolicy`].
///
/// ```rust
/// use ssms_core::{validation::validate_password, SecurityPolicy};
///
/// let policy = SecurityPolicy::default();
/// assert!(validate_password("secret", &policy).is_ok());
/// assert!(validate_password("abc", &policy).is_err());
/// ```
pub fn validate_password(password: &str, policy: &SecurityPolicy) -> ValidationResult<()> {
    if password.chars().count() < policy.password_min_length {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: policy.password_min_length,
        });
    }
    if policy.password_require_special && password.chars().all(char::is_alphanumeric) {
        return Err(ValidationError::InvalidFormat {
            field: "password".to_string(),
            reason: "must contain a special character".to_string(),
        });
    }
    Ok(())
}

/// Search fragments may be empty; returns the trimmed text.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    max_len("query", query, 100)?;
    Ok(query.trim().to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Line quantity: 1..=MAX_LINE_QUANTITY.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }
    Ok(())
}

/// Stock counts and reorder levels may be zero, never negative.
pub fn validate_stock_level(field: &str, qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Prices may be zero, never negative.
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Discount within 0..=subtotal.
pub fn validate_discount_cents(discount: i64, subtotal: i64) -> ValidationResult<()> {
    if discount < 0 || discount > subtotal {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: subtotal,
        });
    }
    Ok(())
}

/// 0% to 100%.
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "tax rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }
    Ok(())
}

/// Report ranges are inclusive and must not be reversed.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> ValidationResult<()> {
    if start > end {
        return Err(ValidationError::InvalidFormat {
            field: "date range".to_string(),
            reason: format!("start {} is after end {}", start, end),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("LAP001").is_ok());
        assert!(validate_sku("tsh-001_b").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Food & Beverages").is_ok());
        assert_eq!(
            validate_name("supplier", " "),
            Err(ValidationError::Required {
                field: "supplier".to_string()
            })
        );
        assert!(validate_name("name", &"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email(None).is_ok());
        assert!(validate_email(Some("")).is_ok());
        assert!(validate_email(Some("contact@abc.com")).is_ok());

        assert!(validate_email(Some("contact.abc.com")).is_err());
        assert!(validate_email(Some("@abc.com")).is_err());
        assert!(validate_email(Some("a@b@c.com")).is_err());
        assert!(validate_email(Some("a@localhost")).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone(Some("9876543210")).is_ok());
        assert!(validate_phone(Some("+91 (98) 765-43210")).is_ok());
        assert!(validate_phone(Some("12345")).is_err());
        assert!(validate_phone(Some("98765x3210")).is_err());
    }

    #[test]
    fn test_validate_username_and_password() {
        assert!(validate_username("admin").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("john doe").is_err());

        let strict = SecurityPolicy {
            password_require_special: true,
            ..SecurityPolicy::default()
        };
        assert!(validate_password("secret1", &strict).is_err());
        assert!(validate_password("secret!", &strict).is_ok());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_LINE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_money_inputs() {
        assert!(validate_price_cents("price", 0).is_ok());
        assert!(validate_price_cents("price", -100).is_err());
        assert!(validate_discount_cents(500, 500).is_ok());
        assert!(validate_discount_cents(501, 500).is_err());
        assert!(validate_tax_rate_bps(10_000).is_ok());
        assert!(validate_tax_rate_bps(10_001).is_err());
        assert!(validate_stock_level("stock", 0).is_ok());
        assert!(validate_stock_level("stock", -1).is_err());
    }

    #[test]
    fn test_validate_date_range() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let feb = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert!(validate_date_range(jan, feb).is_ok());
        assert!(validate_date_range(jan, jan).is_ok());
        assert!(validate_date_range(feb, jan).is_err());
    }
}
