//! # Values and Rows
//!
//! The data the session manager moves opaquely between the store and callers.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SELECT id, name, sku FROM products                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Vec<Row>   (store order preserved)                                    │
//! │   ├── Row { id: Int(1), name: Text("Laptop"),  sku: Text("LAP001") }   │
//! │   ├── Row { id: Int(2), name: Text("T-Shirt"), sku: Text("TSH001") }   │
//! │   └── ...                                                              │
//! │                                                                         │
//! │  Row::get_str("sku") ──► "LAP001"                                      │
//! │  Product::from_row(&row) ──► typed record                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`Value`] is also what callers bind as statement parameters, so the same
//! five shapes flow in both directions.

use chrono::{NaiveDate, NaiveDateTime};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::{CoreError, CoreResult};

/// Timestamp layout produced by `CURRENT_TIMESTAMP` on both backends.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date layout used for `DATE(...)` comparisons.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Value
// =============================================================================

/// A single cell or bound parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// Checks if the value is SQL NULL.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer view. Integral floats (e.g. MySQL DECIMAL sums) coerce.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    /// Float view. Integers widen.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Text view.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Boolean view: non-zero integers are true (TINYINT(1) / SQLite 0/1).
    pub fn as_bool(&self) -> Option<bool> {
        self.as_i64().map(|i| i != 0)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Int(v as i64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Text(v.format(DATE_FORMAT).to_string())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Text(v.format(TIMESTAMP_FORMAT).to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

// =============================================================================
// Row
// =============================================================================

/// One result record: column name → value, in result-set column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Row::default()
    }

    /// Creates an empty row with room for `capacity` columns.
    pub fn with_capacity(capacity: usize) -> Self {
        Row {
            columns: Vec::with_capacity(capacity),
        }
    }

    /// Appends a column.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.columns.push((name.into(), value.into()));
    }

    /// Builder form of [`Row::push`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// (name, value) pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Looks a column up by name.
    ///
    /// Exact match first, then ASCII case-insensitive (MySQL echoes aliases
    /// as written, SQLite sometimes upper-cases expressions).
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .or_else(|| {
                self.columns
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(column))
            })
            .map(|(_, value)| value)
    }

    /// Like [`Row::get`] but a missing column is an error.
    pub fn value(&self, column: &str) -> CoreResult<&Value> {
        self.get(column)
            .ok_or_else(|| CoreError::missing_column(column))
    }

    pub fn get_i64(&self, column: &str) -> CoreResult<i64> {
        self.value(column)?
            .as_i64()
            .ok_or_else(|| CoreError::column_type(column, "an integer"))
    }

    pub fn get_opt_i64(&self, column: &str) -> CoreResult<Option<i64>> {
        match self.value(column)? {
            Value::Null => Ok(None),
            other => other
                .as_i64()
                .map(Some)
                .ok_or_else(|| CoreError::column_type(column, "an integer")),
        }
    }

    pub fn get_f64(&self, column: &str) -> CoreResult<f64> {
        self.value(column)?
            .as_f64()
            .ok_or_else(|| CoreError::column_type(column, "a number"))
    }

    pub fn get_bool(&self, column: &str) -> CoreResult<bool> {
        self.value(column)?
            .as_bool()
            .ok_or_else(|| CoreError::column_type(column, "a boolean"))
    }

    pub fn get_str(&self, column: &str) -> CoreResult<&str> {
        self.value(column)?
            .as_str()
            .ok_or_else(|| CoreError::column_type(column, "text"))
    }

    pub fn get_opt_str(&self, column: &str) -> CoreResult<Option<&str>> {
        match self.value(column)? {
            Value::Null => Ok(None),
            Value::Text(s) => Ok(Some(s.as_str())),
            _ => Err(CoreError::column_type(column, "text")),
        }
    }

    /// Owned copy of a text column.
    pub fn get_string(&self, column: &str) -> CoreResult<String> {
        self.get_str(column).map(str::to_string)
    }

    /// Owned copy of a nullable text column.
    pub fn get_opt_string(&self, column: &str) -> CoreResult<Option<String>> {
        Ok(self.get_opt_str(column)?.map(str::to_string))
    }

    /// Parses a `YYYY-MM-DD HH:MM:SS[.fff]` (or ISO `T`-separated) column.
    pub fn get_datetime(&self, column: &str) -> CoreResult<NaiveDateTime> {
        let text = self.get_str(column)?;
        parse_timestamp(text).ok_or_else(|| CoreError::column_type(column, "a timestamp"))
    }

    pub fn get_opt_datetime(&self, column: &str) -> CoreResult<Option<NaiveDateTime>> {
        match self.get_opt_str(column)? {
            None => Ok(None),
            Some(text) => parse_timestamp(text)
                .map(Some)
                .ok_or_else(|| CoreError::column_type(column, "a timestamp")),
        }
    }

    /// Parses a `YYYY-MM-DD` column. A full timestamp is truncated to its date.
    pub fn get_date(&self, column: &str) -> CoreResult<NaiveDate> {
        let text = self.get_str(column)?;
        NaiveDate::parse_from_str(text, DATE_FORMAT)
            .ok()
            .or_else(|| parse_timestamp(text).map(|ts| ts.date()))
            .ok_or_else(|| CoreError::column_type(column, "a date"))
    }
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Row {
            columns: iter.into_iter().collect(),
        }
    }
}

/// Serializes as a JSON object, keeping column order.
impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// =============================================================================
// FromRow
// =============================================================================

/// Builds a typed record from a result row.
///
/// ## Example
/// ```rust
/// use ssms_core::{Category, FromRow, Row};
///
/// let row = Row::new()
///     .with("id", 1)
///     .with("name", "Electronics")
///     .with("description", "Electronic devices and accessories")
///     .with("is_active", true);
///
/// let category = Category::from_row(&row).unwrap();
/// assert_eq!(category.name, "Electronics");
/// ```
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> CoreResult<Self>;
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product_row() -> Row {
        Row::new()
            .with("id", 1)
            .with("name", "Laptop")
            .with("sku", "LAP001")
            .with("barcode", Value::Null)
            .with("total", Value::Float(6500000.0))
            .with("is_active", 1)
            .with("created_at", "2024-05-01 10:30:00")
    }

    #[test]
    fn test_column_order_preserved() {
        let row = product_row();
        let names: Vec<&str> = row.column_names().collect();
        assert_eq!(
            names,
            vec!["id", "name", "sku", "barcode", "total", "is_active", "created_at"]
        );
    }

    #[test]
    fn test_typed_getters() {
        let row = product_row();
        assert_eq!(row.get_i64("id").unwrap(), 1);
        assert_eq!(row.get_str("sku").unwrap(), "LAP001");
        assert_eq!(row.get_opt_str("barcode").unwrap(), None);
        assert!(row.get_bool("is_active").unwrap());
        // Integral floats coerce (MySQL returns DECIMAL for SUM)
        assert_eq!(row.get_i64("total").unwrap(), 6_500_000);
    }

    #[test]
    fn test_getter_errors() {
        let row = product_row();
        assert_eq!(
            row.get_i64("missing"),
            Err(CoreError::missing_column("missing"))
        );
        assert_eq!(
            row.get_i64("name"),
            Err(CoreError::column_type("name", "an integer"))
        );
    }

    #[test]
    fn test_case_insensitive_fallback() {
        let row = Row::new().with("COUNT(*)", 3);
        assert_eq!(row.get_i64("count(*)").unwrap(), 3);
    }

    #[test]
    fn test_timestamps() {
        let row = product_row()
            .with("iso", "2024-05-01T10:30:00.250")
            .with("day", "2024-05-01");
        let ts = row.get_datetime("created_at").unwrap();
        assert_eq!(ts.format(TIMESTAMP_FORMAT).to_string(), "2024-05-01 10:30:00");
        assert!(row.get_datetime("iso").is_ok());
        assert_eq!(
            row.get_date("created_at").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
        assert_eq!(
            row.get_date("day").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(Some("x")), Value::Text("x".to_string()));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(true), Value::Int(1));
        assert_eq!(
            Value::from(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()),
            Value::Text("2024-01-31".to_string())
        );
    }

    #[test]
    fn test_row_serializes_as_ordered_object() {
        let row = Row::new().with("b", 2).with("a", "x").with("n", Value::Null);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"b":2,"a":"x","n":null}"#);
    }
}
