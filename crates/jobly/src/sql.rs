//! SQL-first dynamic builder.
//!
//! `Sql` lets the job queries compose statements without manually tracking
//! placeholder indices. Two styles are supported:
//! - `push_bind` appends a `$n` placeholder and its value together;
//! - `bind` only stores a value, for SQL that already contains `$1, $2, ...`.
//!
//! # Example
//!
//! ```ignore
//! use jobly::sql;
//!
//! let mut q = sql("SELECT id, title FROM jobs");
//! if let Some(min) = min_salary {
//!     q.push(" WHERE salary >= ").push_bind(min);
//! }
//! q.push(" ORDER BY title");
//!
//! let rows = q.fetch_all(&conn).await?;
//! ```

use crate::client::GenericClient;
use crate::condition::Condition;
use crate::error::{JobError, JobResult};
use crate::row::FromRow;
use std::sync::Arc;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// A shareable, type-erased query parameter.
pub type SqlParam = Arc<dyn ToSql + Sync + Send>;

#[derive(Debug)]
enum SqlPart {
    Raw(String),
    Param,
}

/// A SQL-first, parameter-safe dynamic SQL builder.
///
/// `Sql` stores SQL pieces and parameters separately and generates `$1, $2, ...`
/// placeholders automatically in the final SQL string.
#[derive(Debug)]
pub struct Sql {
    parts: Vec<SqlPart>,
    params: Vec<SqlParam>,
}

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}

/// Returns `true` if every `.`-separated segment matches `[A-Za-z_][A-Za-z0-9_]*`.
pub(crate) fn is_valid_ident(ident: &str) -> bool {
    !ident.is_empty()
        && ident.split('.').all(|seg| {
            let mut chars = seg.chars();
            match chars.next() {
                Some(first) if first == '_' || first.is_ascii_alphabetic() => {
                    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
                }
                _ => false,
            }
        })
}

impl Sql {
    /// Create a new builder with an initial SQL fragment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        Self {
            parts: vec![SqlPart::Raw(initial_sql.into())],
            params: Vec::new(),
        }
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a parameter placeholder and bind its value.
    pub fn push_bind<T>(&mut self, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.push_bind_value(Arc::new(value))
    }

    /// Append a placeholder for an already type-erased value.
    pub fn push_bind_value(&mut self, value: SqlParam) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self.params.push(value);
        self
    }

    /// Chainable bind for SQL that already contains `$1, $2, ...`.
    ///
    /// Only stores the value; no placeholder is added to the SQL.
    pub fn bind<T>(self, value: T) -> Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.bind_value(Arc::new(value))
    }

    /// Type-erased variant of [`Sql::bind`].
    pub fn bind_value(mut self, value: SqlParam) -> Self {
        self.params.push(value);
        self
    }

    /// Render SQL with `$1, $2, ...` placeholders.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        let mut idx: usize = 0;

        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    idx += 1;
                    use std::fmt::Write;
                    let _ = write!(&mut out, "${}", idx);
                }
            }
        }
        out
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }

    fn validate(&self) -> JobResult<()> {
        let placeholder_count = self
            .parts
            .iter()
            .filter(|p| matches!(p, SqlPart::Param))
            .count();

        // bind() adds params without placeholders, so only the push_bind side is checked.
        if placeholder_count > self.params.len() {
            return Err(JobError::invalid_input(format!(
                "Sql: more placeholders({}) than params({})",
                placeholder_count,
                self.params.len()
            )));
        }
        Ok(())
    }

    /// Execute the built SQL and return all rows.
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> JobResult<Vec<Row>> {
        self.validate()?;
        let sql = self.to_sql();
        let params = self.params_ref();
        conn.query(&sql, &params).await
    }

    /// Execute the built SQL and return all rows mapped to `T`.
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> JobResult<Vec<T>> {
        let rows = self.fetch_all(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute the built SQL and return at most one row.
    pub async fn fetch_opt(&self, conn: &impl GenericClient) -> JobResult<Option<Row>> {
        self.validate()?;
        let sql = self.to_sql();
        let params = self.params_ref();
        conn.query_opt(&sql, &params).await
    }

    /// Execute the built SQL and return at most one row mapped to `T`.
    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> JobResult<Option<T>> {
        let row = self.fetch_opt(conn).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Execute the built SQL and return exactly one row mapped to `T`.
    pub async fn fetch_one_as<T: FromRow>(&self, conn: &impl GenericClient) -> JobResult<T> {
        self.validate()?;
        let sql = self.to_sql();
        let params = self.params_ref();
        let row = conn.query_one(&sql, &params).await?;
        T::from_row(&row)
    }

    /// Execute the built SQL and return affected row count.
    pub async fn execute(&self, conn: &impl GenericClient) -> JobResult<u64> {
        self.validate()?;
        let sql = self.to_sql();
        let params = self.params_ref();
        conn.execute(&sql, &params).await
    }

    /// Append a [`Condition`] to this SQL builder.
    pub fn push_condition(&mut self, condition: &Condition) -> &mut Self {
        condition.append_to_sql(self);
        self
    }

    /// Append a `WHERE ...` clause composed of [`Condition`]s joined by `AND`.
    ///
    /// If `conditions` is empty, this is a no-op.
    pub fn push_where_and(&mut self, conditions: &[Condition]) -> &mut Self {
        if conditions.is_empty() {
            return self;
        }
        self.push(" WHERE ");
        for (i, cond) in conditions.iter().enumerate() {
            if i > 0 {
                self.push(" AND ");
            }
            self.push_condition(cond);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_placeholders_in_order() {
        let mut q = sql("SELECT * FROM jobs WHERE salary >= ");
        q.push_bind(100_i32).push(" AND title ILIKE ").push_bind("%j%");

        assert_eq!(
            q.to_sql(),
            "SELECT * FROM jobs WHERE salary >= $1 AND title ILIKE $2"
        );
        assert_eq!(q.params_ref().len(), 2);
    }

    #[test]
    fn bind_keeps_prenumbered_sql() {
        let q = sql("UPDATE jobs SET \"salary\"=$1 WHERE id = $2")
            .bind(400_i32)
            .bind(7_i32);
        assert_eq!(q.to_sql(), "UPDATE jobs SET \"salary\"=$1 WHERE id = $2");
        assert_eq!(q.params_ref().len(), 2);
        assert!(q.validate().is_ok());
    }

    #[test]
    fn ident_check_accepts_simple_and_dotted() {
        assert!(is_valid_ident("jobs"));
        assert!(is_valid_ident("j.company_handle"));
    }

    #[test]
    fn ident_check_rejects_unsafe() {
        assert!(!is_valid_ident("jobs; drop table jobs; --"));
        assert!(!is_valid_ident("1jobs"));
        assert!(!is_valid_ident("jobs..title"));
        assert!(!is_valid_ident("jobs title"));
        assert!(!is_valid_ident(""));
    }

    #[test]
    fn where_and_is_noop_without_conditions() {
        let mut q = sql("SELECT * FROM jobs");
        q.push_where_and(&[]);
        assert_eq!(q.to_sql(), "SELECT * FROM jobs");
    }

    #[test]
    fn where_and_joins_conditions() {
        let mut q = sql("SELECT * FROM jobs");
        q.push_where_and(&[
            Condition::gte("salary", 10_i32).unwrap(),
            Condition::raw("equity > 0"),
        ]);
        assert_eq!(
            q.to_sql(),
            "SELECT * FROM jobs WHERE salary >= $1 AND equity > 0"
        );
        assert_eq!(q.params_ref().len(), 1);
    }
}
