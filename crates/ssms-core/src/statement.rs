//! # Statements and Parameters
//!
//! Pure helpers the session manager runs before it touches the store:
//! deciding whether a statement returns rows, and turning caller parameters
//! into a positional value list.
//!
//! ## Binding Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  "SELECT * FROM products WHERE sku = :sku AND stock_quantity > :min"   │
//! │  Params::named([("sku", "LAP001"), ("min", 0)])                        │
//! │       │                                                                 │
//! │       ▼  Params::bind()                                                 │
//! │  "SELECT * FROM products WHERE sku = ? AND stock_quantity > ?"         │
//! │  [Text("LAP001"), Int(0)]                 kind: Read                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  driver binds each value; nothing is ever spliced into the SQL text    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::borrow::Cow;

use crate::error::{CoreError, CoreResult};
use crate::value::Value;

// =============================================================================
// Statement Kind
// =============================================================================

/// Whether a statement yields a result set or a row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Returns rows (`SELECT`, `SHOW`, a `WITH` ending in `SELECT`, ...).
    Read,
    /// Returns an affected-row count (`INSERT`, `UPDATE`, DDL, ...).
    Write,
}

const READ_KEYWORDS: &[&str] = &[
    "SELECT", "SHOW", "DESCRIBE", "DESC", "EXPLAIN", "PRAGMA", "VALUES",
];

impl StatementKind {
    /// Classifies a statement by its first keyword.
    ///
    /// Leading whitespace, `--` and `/* */` comments and opening parentheses
    /// are skipped. A `WITH` statement is classified by the statement that
    /// follows its CTE list, so `WITH .. UPDATE` is a write. An empty
    /// statement counts as a write (the store will reject it and the
    /// failure is reported like any other).
    ///
    /// ## Example
    /// ```rust
    /// use ssms_core::StatementKind;
    ///
    /// assert_eq!(StatementKind::classify("  select 1"), StatementKind::Read);
    /// assert_eq!(
    ///     StatementKind::classify("/* seed */ INSERT OR IGNORE INTO categories (name) VALUES (?)"),
    ///     StatementKind::Write
    /// );
    /// ```
    pub fn classify(statement: &str) -> StatementKind {
        let keyword = first_keyword(statement);
        if keyword.eq_ignore_ascii_case("WITH") {
            return main_statement_after_ctes(statement);
        }
        if READ_KEYWORDS
            .iter()
            .any(|read| read.eq_ignore_ascii_case(keyword))
        {
            StatementKind::Read
        } else {
            StatementKind::Write
        }
    }

    #[inline]
    pub fn is_read(&self) -> bool {
        matches!(self, StatementKind::Read)
    }
}

fn first_keyword(statement: &str) -> &str {
    let mut rest = statement;
    loop {
        let trimmed = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '(');
        if let Some(after) = trimmed.strip_prefix("--") {
            rest = after.split_once('\n').map(|(_, tail)| tail).unwrap_or("");
        } else if let Some(after) = trimmed.strip_prefix("/*") {
            rest = after.split_once("*/").map(|(_, tail)| tail).unwrap_or("");
        } else {
            rest = trimmed;
            break;
        }
    }
    let end = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    &rest[..end]
}

/// Kind of the statement a `WITH` clause introduces: the first keyword at
/// the clause's own nesting level that starts a statement. CTE bodies and
/// column lists sit inside parentheses and are skipped.
fn main_statement_after_ctes(statement: &str) -> StatementKind {
    let mut depth = 0usize;
    let mut with_depth: Option<usize> = None;
    let mut kind = None;
    scan_code(statement, |i, c, chars| {
        if kind.is_some() {
            return 0;
        }
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if is_ident_start(c) && (i == 0 || !is_ident(chars[i - 1])) => {
                let mut end = i + 1;
                while end < chars.len() && is_ident(chars[end]) {
                    end += 1;
                }
                let word: String = chars[i..end].iter().collect();
                match with_depth {
                    None if word.eq_ignore_ascii_case("WITH") => with_depth = Some(depth),
                    Some(level) if level == depth => {
                        let word = word.to_ascii_uppercase();
                        kind = match word.as_str() {
                            "SELECT" | "VALUES" => Some(StatementKind::Read),
                            "INSERT" | "UPDATE" | "DELETE" | "REPLACE" => {
                                Some(StatementKind::Write)
                            }
                            _ => None,
                        };
                    }
                    _ => {}
                }
                return end - i - 1;
            }
            _ => {}
        }
        0
    });
    kind.unwrap_or(StatementKind::Write)
}

// =============================================================================
// Params
// =============================================================================

/// Parameters for one statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Params {
    /// No parameters.
    #[default]
    None,
    /// Bound to `?` placeholders in order.
    Positional(Vec<Value>),
    /// Bound to `:name` placeholders; rewritten to `?` before execution.
    Named(Vec<(String, Value)>),
}

/// A statement ready for the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement<'s> {
    pub sql: Cow<'s, str>,
    pub values: Vec<Value>,
    pub kind: StatementKind,
}

impl Params {
    /// Positional parameters from anything convertible to [`Value`].
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Params::Positional(values.into_iter().map(Into::into).collect())
    }

    /// Named parameters; names are given without the leading `:`.
    pub fn named<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Params::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Resolves parameters against a statement.
    ///
    /// ## Errors
    /// - [`CoreError::UnboundParameter`] - a `:name` without a value
    /// - [`CoreError::ParameterCount`] - `?` count differs from the values
    ///   given (skipped for numbered `?1` placeholders)
    pub fn bind(self, statement: &str) -> CoreResult<BoundStatement<'_>> {
        let kind = StatementKind::classify(statement);
        match self {
            Params::None => {
                check_positional(statement, 0)?;
                Ok(BoundStatement {
                    sql: Cow::Borrowed(statement),
                    values: Vec::new(),
                    kind,
                })
            }
            Params::Positional(values) => {
                check_positional(statement, values.len())?;
                Ok(BoundStatement {
                    sql: Cow::Borrowed(statement),
                    values,
                    kind,
                })
            }
            Params::Named(pairs) => {
                let (sql, values) = rewrite_named(statement, &pairs)?;
                Ok(BoundStatement {
                    sql: Cow::Owned(sql),
                    values,
                    kind,
                })
            }
        }
    }
}

impl From<Vec<Value>> for Params {
    fn from(values: Vec<Value>) -> Self {
        Params::Positional(values)
    }
}

impl From<()> for Params {
    fn from(_: ()) -> Self {
        Params::None
    }
}

/// Builds positional [`Params`] from a list of expressions.
///
/// ```rust
/// use ssms_core::{params, Params, Value};
///
/// let p = params!["LAP001", 10];
/// assert_eq!(
///     p,
///     Params::Positional(vec![Value::Text("LAP001".into()), Value::Int(10)])
/// );
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::None
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Params::Positional(vec![$($crate::Value::from($value)),+])
    };
}

// =============================================================================
// Placeholder scanning
// =============================================================================

/// Lexical state while walking SQL text.
#[derive(Clone, Copy, PartialEq)]
enum Lex {
    Code,
    Quoted(char),
    LineComment,
    BlockComment,
}

/// Walks `sql`, calling `on_code` for every character outside literals,
/// quoted identifiers and comments. The callback returns how many extra
/// characters it consumed.
fn scan_code<F>(sql: &str, mut on_code: F)
where
    F: FnMut(usize, char, &[char]) -> usize,
{
    let chars: Vec<char> = sql.chars().collect();
    let mut state = Lex::Code;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match state {
            Lex::Code => match c {
                '\'' | '"' | '`' => state = Lex::Quoted(c),
                '-' if next == Some('-') => state = Lex::LineComment,
                '/' if next == Some('*') => state = Lex::BlockComment,
                _ => {
                    i += on_code(i, c, &chars[..]);
                }
            },
            Lex::Quoted(q) => {
                if c == q {
                    // Doubled quote is an escaped quote, stay inside
                    if next == Some(q) {
                        i += 1;
                    } else {
                        state = Lex::Code;
                    }
                }
            }
            Lex::LineComment => {
                if c == '\n' {
                    state = Lex::Code;
                }
            }
            Lex::BlockComment => {
                if c == '*' && next == Some('/') {
                    i += 1;
                    state = Lex::Code;
                }
            }
        }
        i += 1;
    }
}

fn check_positional(statement: &str, given: usize) -> CoreResult<()> {
    let mut expected = 0;
    let mut numbered = false;
    scan_code(statement, |i, c, chars| {
        if c == '?' {
            expected += 1;
            if chars.get(i + 1).is_some_and(|n| n.is_ascii_digit()) {
                numbered = true;
            }
        }
        0
    });

    if numbered || expected == given {
        Ok(())
    } else {
        Err(CoreError::ParameterCount { expected, given })
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn rewrite_named(statement: &str, pairs: &[(String, Value)]) -> CoreResult<(String, Vec<Value>)> {
    // Collect placeholder spans first, then rebuild the text
    let mut spans: Vec<(usize, usize, String)> = Vec::new();
    scan_code(statement, |i, c, chars| {
        if c != ':' {
            return 0;
        }
        let prev_colon = i > 0 && chars[i - 1] == ':';
        match chars.get(i + 1) {
            Some(&':') => 1,
            Some(&n) if is_ident_start(n) && !prev_colon => {
                let mut end = i + 1;
                while end < chars.len() && is_ident(chars[end]) {
                    end += 1;
                }
                spans.push((i, end, chars[i + 1..end].iter().collect()));
                end - i - 1
            }
            _ => 0,
        }
    });

    let chars: Vec<char> = statement.chars().collect();
    let mut sql = String::with_capacity(statement.len());
    let mut values = Vec::with_capacity(spans.len());
    let mut cursor = 0;
    for (start, end, name) in spans {
        let value = pairs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| CoreError::UnboundParameter { name: name.clone() })?;
        sql.extend(&chars[cursor..start]);
        sql.push('?');
        values.push(value);
        cursor = end;
    }
    sql.extend(&chars[cursor..]);

    Ok((sql, values))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_reads() {
        assert_eq!(StatementKind::classify("SELECT * FROM products"), StatementKind::Read);
        assert_eq!(StatementKind::classify("\n\t select 1"), StatementKind::Read);
        assert_eq!(
            StatementKind::classify("WITH t AS (SELECT 1) SELECT * FROM t"),
            StatementKind::Read
        );
        assert_eq!(StatementKind::classify("(SELECT 1) UNION (SELECT 2)"), StatementKind::Read);
        assert_eq!(
            StatementKind::classify("-- dashboard\nSELECT COUNT(*) FROM sales"),
            StatementKind::Read
        );
        assert_eq!(StatementKind::classify("/* a */ /* b */ SHOW TABLES"), StatementKind::Read);
        assert_eq!(StatementKind::classify("PRAGMA table_info(products)"), StatementKind::Read);
        assert_eq!(
            StatementKind::classify(
                "WITH RECURSIVE days(d) AS (SELECT 1 UNION ALL SELECT d + 1 FROM days WHERE d < 7), \
                 totals AS (SELECT 'update' AS note) SELECT * FROM days, totals"
            ),
            StatementKind::Read
        );
    }

    #[test]
    fn test_classify_cte_writes() {
        assert_eq!(
            StatementKind::classify(
                "WITH low AS (SELECT id FROM products WHERE stock_quantity < 20) \
                 UPDATE products SET min_stock_level = 7 WHERE id IN (SELECT id FROM low)"
            ),
            StatementKind::Write
        );
        assert_eq!(
            StatementKind::classify(
                "with gone as (select id from products where is_active = 0) \
                 delete from stock_movements where product_id in (select id from gone)"
            ),
            StatementKind::Write
        );
        assert_eq!(
            StatementKind::classify(
                "/* restock */ WITH src (name) AS (SELECT 'Toys') INSERT INTO categories (name) SELECT name FROM src"
            ),
            StatementKind::Write
        );
    }

    #[test]
    fn test_classify_writes() {
        assert_eq!(
            StatementKind::classify("INSERT INTO categories (name) VALUES (?)"),
            StatementKind::Write
        );
        assert_eq!(StatementKind::classify("update products set x = 1"), StatementKind::Write);
        assert_eq!(
            StatementKind::classify("CREATE TABLE IF NOT EXISTS users (id INT)"),
            StatementKind::Write
        );
        // "SELECTED" is not SELECT
        assert_eq!(StatementKind::classify("SELECTED"), StatementKind::Write);
        assert_eq!(StatementKind::classify(""), StatementKind::Write);
        assert_eq!(StatementKind::classify("-- only a comment"), StatementKind::Write);
    }

    #[test]
    fn test_positional_count_checked() {
        let bound = params!["LAP001"]
            .bind("SELECT * FROM products WHERE sku = ?")
            .unwrap();
        assert_eq!(bound.values, vec![Value::Text("LAP001".into())]);
        assert!(matches!(bound.sql, Cow::Borrowed(_)));

        let err = Params::None
            .bind("SELECT * FROM products WHERE sku = ?")
            .unwrap_err();
        assert_eq!(err, CoreError::ParameterCount { expected: 1, given: 0 });

        // '?' inside a literal is not a placeholder
        assert!(Params::None
            .bind("SELECT * FROM products WHERE name = 'what?'")
            .is_ok());

        // numbered placeholders may repeat
        assert!(params![1]
            .bind("SELECT * FROM products WHERE id = ?1 OR parent = ?1")
            .is_ok());
    }

    #[test]
    fn test_named_rewrite() {
        let bound = Params::named([("sku", Value::from("LAP001")), ("min", Value::from(2))])
            .bind("SELECT * FROM products WHERE sku = :sku AND stock_quantity > :min OR sku = :sku")
            .unwrap();
        assert_eq!(
            bound.sql,
            "SELECT * FROM products WHERE sku = ? AND stock_quantity > ? OR sku = ?"
        );
        assert_eq!(
            bound.values,
            vec![
                Value::Text("LAP001".into()),
                Value::Int(2),
                Value::Text("LAP001".into())
            ]
        );
        assert_eq!(bound.kind, StatementKind::Read);
    }

    #[test]
    fn test_named_skips_literals_and_casts() {
        let bound = Params::named([("id", 7)])
            .bind("SELECT ':not_a_param', x::text, \"a:b\" FROM t -- :comment\nWHERE id = :id")
            .unwrap();
        assert_eq!(
            bound.sql,
            "SELECT ':not_a_param', x::text, \"a:b\" FROM t -- :comment\nWHERE id = ?"
        );
        assert_eq!(bound.values, vec![Value::Int(7)]);
    }

    #[test]
    fn test_named_unbound() {
        let err = Params::named([("sku", "LAP001")])
            .bind("UPDATE products SET stock_quantity = :qty WHERE sku = :sku")
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::UnboundParameter {
                name: "qty".to_string()
            }
        );
    }

    #[test]
    fn test_escaped_quotes() {
        let bound = Params::named([("n", "x")])
            .bind("SELECT 'it''s :n' , :n")
            .unwrap();
        assert_eq!(bound.sql, "SELECT 'it''s :n' , ?");
    }
}
