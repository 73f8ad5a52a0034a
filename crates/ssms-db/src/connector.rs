//! # Connectors
//!
//! The seam between the session manager and a concrete driver.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Session<C: Connector>                                                  │
//! │       │ open(&DbConfig)                                                 │
//! │       ▼                                                                 │
//! │  C::Handle: DbHandle ── run(sql, values, kind, timeout) ──► Outcome     │
//! │       │                                                                 │
//! │       └── close()                                                       │
//! │                                                                         │
//! │  SqlxConnector  ──► SqlxHandle { SqliteConnection | MySqlConnection }   │
//! │  (tests)        ──► counting / fault-injecting doubles                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each handle is a single connection in autocommit mode: a write is
//! committed as soon as `run` returns.

use std::future::Future;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column, ConnectOptions, Connection, Database, Encode, Row as _, Type, TypeInfo, ValueRef};
use ssms_core::{Row, StatementKind, Value, DATE_FORMAT, TIMESTAMP_FORMAT};
use tracing::debug;

use crate::config::{Backend, DbConfig};
use crate::error::{DbError, DbResult};

// =============================================================================
// Traits
// =============================================================================

/// What one statement produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Rows(Vec<Row>),
    Affected(u64),
}

/// A live connection.
pub trait DbHandle: Send {
    /// Runs one statement with `values` bound to its `?` placeholders.
    ///
    /// Reads return [`Outcome::Rows`] in store order, writes return
    /// [`Outcome::Affected`]. The whole call is bounded by `timeout`.
    fn run(
        &mut self,
        sql: &str,
        values: &[Value],
        kind: StatementKind,
        timeout: Duration,
    ) -> impl Future<Output = DbResult<Outcome>> + Send;

    /// Closes the connection.
    fn close(self) -> impl Future<Output = DbResult<()>> + Send;
}

/// Opens handles from a configuration.
pub trait Connector: Send + Sync {
    type Handle: DbHandle;

    fn open(&self, config: &DbConfig) -> impl Future<Output = DbResult<Self::Handle>> + Send;
}

// =============================================================================
// sqlx implementation
// =============================================================================

/// Production connector over sqlx's MySQL and SQLite drivers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlxConnector;

/// One sqlx connection of either backend.
#[derive(Debug)]
pub enum SqlxHandle {
    Sqlite(SqliteConnection),
    MySql(MySqlConnection),
}

impl Connector for SqlxConnector {
    type Handle = SqlxHandle;

    async fn open(&self, config: &DbConfig) -> DbResult<SqlxHandle> {
        let limit = config.connect_timeout;
        let connecting = async {
            match config.backend {
                Backend::Sqlite => {
                    let options = SqliteConnectOptions::new()
                        .filename(&config.database)
                        .create_if_missing(true)
                        .foreign_keys(true)
                        .busy_timeout(config.write_timeout)
                        .disable_statement_logging();
                    options
                        .connect()
                        .await
                        .map(SqlxHandle::Sqlite)
                        .map_err(DbError::connect)
                }
                Backend::MySql => {
                    let password = config
                        .password
                        .as_deref()
                        .ok_or(DbError::MissingCredentials)?;
                    let mut options = MySqlConnectOptions::new()
                        .host(&config.host)
                        .username(&config.user)
                        .password(password)
                        .database(&config.database)
                        .charset(&config.charset)
                        .disable_statement_logging();
                    if let Some(port) = config.effective_port() {
                        options = options.port(port);
                    }
                    options
                        .connect()
                        .await
                        .map(SqlxHandle::MySql)
                        .map_err(DbError::connect)
                }
            }
        };

        match tokio::time::timeout(limit, connecting).await {
            Ok(result) => result,
            Err(_) => Err(DbError::Timeout {
                phase: "connect",
                after: limit,
            }),
        }
    }
}

impl DbHandle for SqlxHandle {
    async fn run(
        &mut self,
        sql: &str,
        values: &[Value],
        kind: StatementKind,
        timeout: Duration,
    ) -> DbResult<Outcome> {
        let running = async {
            match self {
                SqlxHandle::Sqlite(conn) => {
                    let query = bind_values(sqlx::query(sql), values);
                    if kind.is_read() {
                        let rows = query.fetch_all(&mut *conn).await?;
                        rows.iter()
                            .map(decode_sqlite_row)
                            .collect::<DbResult<Vec<_>>>()
                            .map(Outcome::Rows)
                    } else {
                        let done = query.execute(&mut *conn).await?;
                        Ok(Outcome::Affected(done.rows_affected()))
                    }
                }
                SqlxHandle::MySql(conn) => {
                    let query = bind_values(sqlx::query(sql), values);
                    if kind.is_read() {
                        let rows = query.fetch_all(&mut *conn).await?;
                        rows.iter()
                            .map(decode_mysql_row)
                            .collect::<DbResult<Vec<_>>>()
                            .map(Outcome::Rows)
                    } else {
                        let done = query.execute(&mut *conn).await?;
                        Ok(Outcome::Affected(done.rows_affected()))
                    }
                }
            }
        };

        match tokio::time::timeout(timeout, running).await {
            Ok(result) => result,
            Err(_) => Err(DbError::Timeout {
                phase: if kind.is_read() { "read" } else { "write" },
                after: timeout,
            }),
        }
    }

    async fn close(self) -> DbResult<()> {
        match self {
            SqlxHandle::Sqlite(conn) => conn.close().await?,
            SqlxHandle::MySql(conn) => conn.close().await?,
        }
        debug!("Connection closed");
        Ok(())
    }
}

/// Binds each value in order. NULL binds as a typed-null integer, which both
/// backends accept for any column.
fn bind_values<'q, DB>(
    query: Query<'q, DB, <DB as Database>::Arguments<'q>>,
    values: &'q [Value],
) -> Query<'q, DB, <DB as Database>::Arguments<'q>>
where
    DB: Database,
    i64: Encode<'q, DB> + Type<DB>,
    f64: Encode<'q, DB> + Type<DB>,
    &'q str: Encode<'q, DB> + Type<DB>,
    &'q [u8]: Encode<'q, DB> + Type<DB>,
    Option<i64>: Encode<'q, DB> + Type<DB>,
{
    values.iter().fold(query, |query, value| match value {
        Value::Null => query.bind(None::<i64>),
        Value::Int(i) => query.bind(*i),
        Value::Float(f) => query.bind(*f),
        Value::Text(s) => query.bind(s.as_str()),
        Value::Bytes(b) => query.bind(b.as_slice()),
    })
}

// =============================================================================
// Row decoding
// =============================================================================

/// SQLite is dynamically typed: decode by each value's storage class.
fn decode_sqlite_row(row: &SqliteRow) -> DbResult<Row> {
    let mut out = Row::with_capacity(row.len());
    for (i, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(i)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            let storage = raw.type_info().name().to_string();
            match storage.as_str() {
                "INTEGER" | "BOOLEAN" => Value::Int(row.try_get_unchecked::<i64, _>(i)?),
                "REAL" => Value::Float(row.try_get_unchecked::<f64, _>(i)?),
                "BLOB" => Value::Bytes(row.try_get_unchecked::<Vec<u8>, _>(i)?),
                _ => Value::Text(row.try_get_unchecked::<String, _>(i)?),
            }
        };
        out.push(column.name(), value);
    }
    Ok(out)
}

/// MySQL: decode by declared column type.
fn decode_mysql_row(row: &MySqlRow) -> DbResult<Row> {
    let mut out = Row::with_capacity(row.len());
    for (i, column) in row.columns().iter().enumerate() {
        if row.try_get_raw(i)?.is_null() {
            out.push(column.name(), Value::Null);
            continue;
        }

        let type_name = column.type_info().name();
        let value = match type_name {
            "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
                Value::Int(row.try_get_unchecked::<i64, _>(i)?)
            }
            name if name.ends_with("UNSIGNED") => {
                let n = row.try_get_unchecked::<u64, _>(i)?;
                i64::try_from(n)
                    .map(Value::Int)
                    .unwrap_or(Value::Float(n as f64))
            }
            "FLOAT" => Value::Float(row.try_get_unchecked::<f32, _>(i)? as f64),
            "DOUBLE" => Value::Float(row.try_get_unchecked::<f64, _>(i)?),
            // SUM()/AVG() come back as DECIMAL text
            "DECIMAL" => {
                let text = row.try_get_unchecked::<String, _>(i)?;
                decimal_value(column.name(), &text)?
            }
            "DATETIME" | "TIMESTAMP" => {
                let ts = row.try_get_unchecked::<NaiveDateTime, _>(i)?;
                Value::Text(ts.format(TIMESTAMP_FORMAT).to_string())
            }
            "DATE" => {
                let date = row.try_get_unchecked::<NaiveDate, _>(i)?;
                Value::Text(date.format(DATE_FORMAT).to_string())
            }
            "TIME" => {
                let time = row.try_get_unchecked::<NaiveTime, _>(i)?;
                Value::Text(time.format("%H:%M:%S").to_string())
            }
            "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" | "BIT"
            | "GEOMETRY" => Value::Bytes(row.try_get_unchecked::<Vec<u8>, _>(i)?),
            _ => Value::Text(row.try_get_unchecked::<String, _>(i)?),
        };
        out.push(column.name(), value);
    }
    Ok(out)
}

/// Integral decimals become `Int`, the rest `Float`.
fn decimal_value(column: &str, text: &str) -> DbResult<Value> {
    if let Ok(i) = text.parse::<i64>() {
        return Ok(Value::Int(i));
    }
    text.parse::<f64>()
        .map(Value::Float)
        .map_err(|_| DbError::Decode(format!("column '{}': bad DECIMAL '{}'", column, text)))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_decimal_value() {
        assert_eq!(decimal_value("total", "6590000").unwrap(), Value::Int(6_590_000));
        assert_eq!(decimal_value("avg", "12.50").unwrap(), Value::Float(12.5));
        assert!(decimal_value("avg", "n/a").is_err());
    }

    #[tokio::test]
    async fn test_mysql_without_password_fails_fast() {
        let config = DbConfig::default().host("127.0.0.1");
        let err = SqlxConnector.open(&config).await.unwrap_err();
        assert_eq!(err, DbError::MissingCredentials);
    }

    #[tokio::test]
    async fn test_sqlite_handle_round_trip() {
        let dir = TempDir::new().unwrap();
        let config = DbConfig::sqlite(dir.path().join("handle.db"));
        let mut handle = SqlxConnector.open(&config).await.unwrap();
        let limit = Duration::from_secs(5);

        let created = handle
            .run(
                "CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT, price REAL, data BLOB)",
                &[],
                StatementKind::Write,
                limit,
            )
            .await
            .unwrap();
        assert_eq!(created, Outcome::Affected(0));

        let inserted = handle
            .run(
                "INSERT INTO t (name, price, data) VALUES (?, ?, ?), (?, ?, ?)",
                &[
                    Value::from("Laptop"),
                    Value::Float(650.5),
                    Value::Bytes(vec![1, 2]),
                    Value::Null,
                    Value::Null,
                    Value::Null,
                ],
                StatementKind::Write,
                limit,
            )
            .await
            .unwrap();
        assert_eq!(inserted, Outcome::Affected(2));

        let Outcome::Rows(rows) = handle
            .run(
                "SELECT id, name, price, data FROM t ORDER BY id",
                &[],
                StatementKind::Read,
                limit,
            )
            .await
            .unwrap()
        else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("id"), Some(&Value::Int(1)));
        assert_eq!(rows[0].get("name"), Some(&Value::from("Laptop")));
        assert_eq!(rows[0].get("price"), Some(&Value::Float(650.5)));
        assert_eq!(rows[0].get("data"), Some(&Value::Bytes(vec![1, 2])));
        assert_eq!(rows[1].get("name"), Some(&Value::Null));

        handle.close().await.unwrap();
    }
}
