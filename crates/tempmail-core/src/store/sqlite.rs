/// SQLite-backed store
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::Value;
use sqlx::query::Query;
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use super::{Database, Param, Row, RunOutcome, Statement};
use crate::error::Result;

const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS address (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS raw_mails (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        message_id TEXT,
        source TEXT,
        address TEXT,
        raw TEXT,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )
    ",
    r"CREATE INDEX IF NOT EXISTS idx_raw_mails_address ON raw_mails(address)",
    r"
    CREATE TABLE IF NOT EXISTS sendbox (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        address TEXT,
        raw TEXT,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )
    ",
    r"CREATE INDEX IF NOT EXISTS idx_sendbox_address ON sendbox(address)",
    r"
    CREATE TABLE IF NOT EXISTS address_sender (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        address TEXT UNIQUE,
        balance INTEGER DEFAULT 0,
        enabled INTEGER DEFAULT 1,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS users_address (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        address_id INTEGER NOT NULL UNIQUE,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )
    ",
];

/// Store backed by a sqlx SQLite pool
#[derive(Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Connect to `database_url`, creating the file and schema if missing.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.initialize().await?;
        info!("Connected to SQLite store");
        Ok(db)
    }

    /// Create an in-memory store for testing.
    ///
    /// The pool holds a single connection that never expires, so every
    /// statement sees the same database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.initialize().await?;
        Ok(db)
    }

    async fn initialize(&self) -> Result<()> {
        for ddl in SCHEMA {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        debug!(tables = SCHEMA.len(), "Schema initialized");
        Ok(())
    }
}

fn build_query(statement: &Statement) -> Query<'_, Sqlite, SqliteArguments<'_>> {
    statement
        .params
        .iter()
        .fold(sqlx::query(&statement.sql), |query, param| match param {
            Param::Null => query.bind(None::<String>),
            Param::Integer(v) => query.bind(*v),
            Param::Real(v) => query.bind(*v),
            Param::Text(v) => query.bind(v.as_str()),
        })
}

fn row_to_json(row: &SqliteRow) -> Result<Row> {
    let mut map = Row::new();
    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" | "BOOLEAN" => Value::from(row.try_get_unchecked::<i64, _>(index)?),
                "REAL" => Value::from(row.try_get_unchecked::<f64, _>(index)?),
                "BLOB" => Value::from(STANDARD.encode(row.try_get_unchecked::<Vec<u8>, _>(index)?)),
                _ => Value::from(row.try_get_unchecked::<String, _>(index)?),
            }
        };
        map.insert(column.name().to_string(), value);
    }
    Ok(map)
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn all(&self, statement: &Statement) -> Result<Vec<Row>> {
        let rows = build_query(statement).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_json).collect()
    }

    async fn first(&self, statement: &Statement) -> Result<Option<Row>> {
        let row = build_query(statement).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_json).transpose()
    }

    async fn run(&self, statement: &Statement) -> Result<RunOutcome> {
        let result = build_query(statement).execute(&self.pool).await?;
        Ok(RunOutcome {
            rows_affected: result.rows_affected(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::column_str;

    #[tokio::test]
    async fn test_round_trip_row_types() {
        let db = SqliteDatabase::in_memory().await.unwrap();

        db.run(&Statement::new("INSERT INTO address (name) VALUES (?)").bind("alice@example.com"))
            .await
            .unwrap();

        let row = db
            .first(&Statement::new(
                "SELECT id, name, 1.5 AS ratio, NULL AS \"nothing\", x'6869' AS bytes FROM address",
            ))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(row["id"], Value::from(1));
        assert_eq!(column_str(&row, "name"), Some("alice@example.com"));
        assert_eq!(row["ratio"], Value::from(1.5));
        assert_eq!(row["nothing"], Value::Null);
        assert_eq!(row["bytes"], Value::from("aGk="));
    }

    #[tokio::test]
    async fn test_run_reports_rows_affected() {
        let db = SqliteDatabase::in_memory().await.unwrap();

        let outcome = db
            .run(&Statement::new("DELETE FROM address WHERE id = ?").bind(42_i64))
            .await
            .unwrap();
        assert_eq!(outcome.rows_affected, 0);

        db.run(&Statement::new("INSERT INTO address (name) VALUES (?)").bind("a@example.com"))
            .await
            .unwrap();
        let outcome = db
            .run(&Statement::new("DELETE FROM address WHERE name = ?").bind("a@example.com"))
            .await
            .unwrap();
        assert_eq!(outcome.rows_affected, 1);
    }

    #[tokio::test]
    async fn test_statement_failure_is_reported() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let result = db.run(&Statement::new("DELETE FROM no_such_table")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_schema_is_idempotent() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        db.initialize().await.unwrap();
    }
}
