//! Query condition primitives for the job filters.
//!
//! A [`Condition`] is either a raw SQL fragment or a `column <op> $n` comparison
//! whose value is bound through [`Sql`].

use crate::error::{JobError, JobResult};
use crate::sql::{Sql, SqlParam, is_valid_ident};
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// Comparison operator for a structured condition.
#[derive(Debug, Clone)]
pub enum Op<T> {
    /// Greater than or equal: column >= value
    Gte(T),
    /// Case-insensitive LIKE (PostgreSQL ILIKE)
    Ilike(T),
}

#[derive(Debug, Clone)]
enum ConditionInner {
    /// Raw SQL condition; never built from user input.
    Raw(String),
    Expr {
        column: String,
        operator: &'static str,
        value: SqlParam,
    },
}

/// A query condition primitive used by the query composer.
#[derive(Debug, Clone)]
pub struct Condition(ConditionInner);

impl Condition {
    /// Create a structured condition from a column identifier and operator.
    pub fn new<T>(column: &str, op: Op<T>) -> JobResult<Self>
    where
        T: ToSql + Send + Sync + 'static,
    {
        if !is_valid_ident(column) {
            return Err(JobError::invalid_input(format!(
                "Condition: invalid column '{}'",
                column
            )));
        }
        let (operator, value): (&'static str, SqlParam) = match op {
            Op::Gte(v) => (">=", Arc::new(v)),
            Op::Ilike(v) => ("ILIKE", Arc::new(v)),
        };

        Ok(Condition(ConditionInner::Expr {
            column: column.to_string(),
            operator,
            value,
        }))
    }

    /// Create a raw SQL condition.
    ///
    /// The fragment is emitted verbatim, so only pass literals.
    pub fn raw(sql: impl Into<String>) -> Self {
        Condition(ConditionInner::Raw(sql.into()))
    }

    /// Create a greater-than-or-equal condition: column >= value
    pub fn gte<T>(column: &str, value: T) -> JobResult<Self>
    where
        T: ToSql + Send + Sync + 'static,
    {
        Self::new(column, Op::Gte(value))
    }

    /// Create a case-insensitive ILIKE condition: column ILIKE pattern
    pub fn ilike<T>(column: &str, pattern: T) -> JobResult<Self>
    where
        T: ToSql + Send + Sync + 'static,
    {
        Self::new(column, Op::Ilike(pattern))
    }

    /// Whether this condition binds a parameter.
    pub fn has_param(&self) -> bool {
        matches!(self.0, ConditionInner::Expr { .. })
    }

    /// Append this condition into a [`Sql`] builder.
    ///
    /// Placeholders are generated by `Sql`, so indices stay correct however
    /// many conditions precede this one.
    pub fn append_to_sql(&self, sql: &mut Sql) {
        match &self.0 {
            ConditionInner::Raw(s) => {
                sql.push(s);
            }
            ConditionInner::Expr {
                column,
                operator,
                value,
            } => {
                sql.push(column);
                sql.push(" ");
                sql.push(operator);
                sql.push(" ");
                sql.push_bind_value(value.clone());
            }
        }
    }
}
