/// Paginated list retrieval shared by every "browse a collection" endpoint
///
/// A [`ListQuery`] is a data statement and a count statement sharing one set of
/// bind parameters. Callers pick the statement pair matching the filters they
/// were given; this module only paginates and executes the pair.
use serde::Serialize;
use tracing::debug;

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::error::Result;
use crate::store::{self, Database, Param, Row, Statement};

/// Page window derived from untrusted `limit`/`offset` strings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl Page {
    /// Parse user-supplied values.
    ///
    /// A missing, non-numeric, zero or negative limit becomes
    /// [`DEFAULT_PAGE_SIZE`]; anything above [`MAX_PAGE_SIZE`] is clamped.
    /// A missing, non-numeric or negative offset becomes 0.
    pub fn parse(limit: Option<&str>, offset: Option<&str>) -> Self {
        let limit = match limit.and_then(|v| v.trim().parse::<i64>().ok()) {
            Some(n) if n > 0 => n.min(MAX_PAGE_SIZE),
            _ => DEFAULT_PAGE_SIZE,
        };
        let offset = offset
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|n| *n >= 0)
            .unwrap_or(0);

        Self { limit, offset }
    }
}

/// Body returned by every list endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListResponse {
    pub results: Vec<Row>,
    pub total: i64,
}

/// A data/count statement pair over one collection
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    data_sql: String,
    count_sql: String,
    params: Vec<Param>,
}

impl ListQuery {
    pub fn new(data_sql: impl Into<String>, count_sql: impl Into<String>) -> Self {
        Self {
            data_sql: data_sql.into(),
            count_sql: count_sql.into(),
            params: Vec::new(),
        }
    }

    /// Add a parameter bound to both statements
    pub fn bind(mut self, param: impl Into<Param>) -> Self {
        self.params.push(param.into());
        self
    }

    /// The data statement, with `LIMIT ? OFFSET ?` appended
    pub fn data_statement(&self, page: Page) -> Statement {
        let mut params = self.params.clone();
        params.push(Param::Integer(page.limit));
        params.push(Param::Integer(page.offset));
        Statement::with_params(
            format!("{} LIMIT ? OFFSET ?", self.data_sql.trim_end()),
            params,
        )
    }

    pub fn count_statement(&self) -> Statement {
        Statement::with_params(self.count_sql.clone(), self.params.clone())
    }

    /// Execute both statements. A failure of either is returned as is.
    pub async fn execute(&self, db: &dyn Database, page: Page) -> Result<ListResponse> {
        let data = self.data_statement(page);
        let count = self.count_statement();

        let (results, total) = futures::try_join!(db.all(&data), store::count(db, &count))?;

        debug!(
            limit = page.limit,
            offset = page.offset,
            returned = results.len(),
            total,
            "List query executed"
        );

        Ok(ListResponse { results, total })
    }
}

/// `%value%` pattern for `LIKE` substring matches
pub fn like_pattern(value: &str) -> String {
    format!("%{}%", value)
}
