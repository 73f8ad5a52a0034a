//! # Error Types
//!
//! Domain-specific error types for ssms-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ssms-core errors (this file)                                          │
//! │  ├── CoreError        - Row mapping, parameters, stock rules           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  ssms-db errors (separate crate)                                       │
//! │  └── DbError          - Connectivity / Statement / Integrity           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → view shows a banner     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core errors: record mapping, statement parameters and business rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A result row lacks a column a record needs.
    ///
    /// ## When This Occurs
    /// - The SELECT list doesn't match the record being built
    /// - A column was renamed in the schema but not in the query
    #[error("Column '{column}' missing from result row")]
    MissingColumn { column: String },

    /// A column holds a value of the wrong shape.
    #[error("Column '{column}' is not {expected}")]
    ColumnType { column: String, expected: &'static str },

    /// A stored enum label is not recognised.
    #[error("Unknown {kind} label: '{label}'")]
    UnknownLabel { kind: &'static str, label: String },

    /// A named placeholder (`:name`) has no value.
    #[error("No value bound for parameter ':{name}'")]
    UnboundParameter { name: String },

    /// Positional placeholder count doesn't match the values given.
    #[error("Statement expects {expected} parameters, {given} given")]
    ParameterCount { expected: usize, given: usize },

    /// Not enough stock to complete the movement.
    ///
    /// ## User Workflow
    /// ```text
    /// Record sale (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { sku: "LAP001", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// View shows: "Only 3 LAP001 in stock"
    /// ```
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a MissingColumn error.
    pub fn missing_column(column: impl Into<String>) -> Self {
        CoreError::MissingColumn {
            column: column.into(),
        }
    }

    /// Creates a ColumnType error.
    pub fn column_type(column: impl Into<String>, expected: &'static str) -> Self {
        CoreError::ColumnType {
            column: column.into(),
            expected,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before a statement is built, so invalid input never reaches SQL.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., email without '@', reversed date range).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            sku: "LAP001".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for LAP001: available 3, requested 5"
        );

        let err = CoreError::UnboundParameter {
            name: "sku".to_string(),
        };
        assert_eq!(err.to_string(), "No value bound for parameter ':sku'");
    }

    #[test]
    fn test_column_errors() {
        assert_eq!(
            CoreError::missing_column("sku").to_string(),
            "Column 'sku' missing from result row"
        );
        assert_eq!(
            CoreError::column_type("stock_quantity", "an integer").to_string(),
            "Column 'stock_quantity' is not an integer"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
