/// Relational store seam
///
/// Every component talks to storage through [`Database`], one parameterized
/// statement at a time. The store reports success or failure per statement and
/// nothing here assumes transactions spanning several statements.
pub mod sqlite;

use async_trait::async_trait;
use serde_json::{Map, Number, Value};

use crate::error::Result;

pub use sqlite::SqliteDatabase;

/// A result row, keyed by column name
pub type Row = Map<String, Value>;

/// Bind parameter for a [`Statement`]
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for Param {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

/// Integral numbers bind as integers, everything else as reals
impl From<&Number> for Param {
    fn from(value: &Number) -> Self {
        match (value.as_i64(), value.as_f64()) {
            (Some(v), _) => Self::Integer(v),
            (None, Some(v)) => Self::Real(v),
            (None, None) => Self::Null,
        }
    }
}

/// Booleans are stored as 0/1
impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// SQL text with its ordered bind parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Param>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(sql: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn bind(mut self, param: impl Into<Param>) -> Self {
        self.params.push(param.into());
        self
    }
}

/// Outcome of a mutating statement that the store reported as successful
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOutcome {
    pub rows_affected: u64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute a query and return every row
    async fn all(&self, statement: &Statement) -> Result<Vec<Row>>;

    /// Execute a query and return its first row, if any
    async fn first(&self, statement: &Statement) -> Result<Option<Row>>;

    /// Execute a mutating statement
    ///
    /// An `Err` is the store's report that this single statement failed.
    /// Zero affected rows is still a success.
    async fn run(&self, statement: &Statement) -> Result<RunOutcome>;
}

/// Read an integer column from a row
pub fn column_i64(row: &Row, column: &str) -> Option<i64> {
    row.get(column).and_then(Value::as_i64)
}

/// Read a text column from a row
pub fn column_str<'a>(row: &'a Row, column: &str) -> Option<&'a str> {
    row.get(column).and_then(Value::as_str)
}

/// Run a `SELECT count(*) as count ...` statement
pub async fn count(db: &dyn Database, statement: &Statement) -> Result<i64> {
    let row = db.first(statement).await?;
    Ok(row.as_ref().and_then(|r| column_i64(r, "count")).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_statement_binding() {
        let stmt = Statement::new("UPDATE address_sender SET enabled = ?, balance = ? WHERE id = ?")
            .bind(true)
            .bind(10_i64)
            .bind("abc");

        assert_eq!(
            stmt.params,
            vec![
                Param::Integer(1),
                Param::Integer(10),
                Param::Text("abc".to_string())
            ]
        );
    }

    #[test]
    fn test_optional_param() {
        assert_eq!(Param::from(None::<i64>), Param::Null);
        assert_eq!(Param::from(Some("x")), Param::Text("x".to_string()));
    }

    #[test]
    fn test_column_readers() {
        let row = json!({"count": 3, "name": "alice@example.com"});
        let row = row.as_object().unwrap();

        assert_eq!(column_i64(row, "count"), Some(3));
        assert_eq!(column_str(row, "name"), Some("alice@example.com"));
        assert_eq!(column_i64(row, "missing"), None);
    }

    #[tokio::test]
    async fn test_count_defaults_to_zero_without_row() {
        let mut db = MockDatabase::new();
        db.expect_first().returning(|_| Ok(None));

        let total = count(&db, &Statement::new("SELECT count(*) as count FROM address"))
            .await
            .unwrap();
        assert_eq!(total, 0);
    }
}
