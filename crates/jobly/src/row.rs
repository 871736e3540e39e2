//! Row mapping traits and utilities

use crate::error::{JobError, JobResult};
use tokio_postgres::Row;

/// Trait for converting a database row into a Rust struct.
///
/// Columns are read by the `AS` alias given in the query, so a row type only
/// works with queries that project the matching names.
///
/// # Example
///
/// ```ignore
/// use jobly::{FromRow, RowExt};
///
/// struct Handle(String);
///
/// impl FromRow for Handle {
///     fn from_row(row: &Row) -> JobResult<Self> {
///         Ok(Self(row.try_get_column("handle")?))
///     }
/// }
/// ```
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> JobResult<Self>;
}

/// Extension trait for Row to provide typed access
pub trait RowExt {
    /// Try to get a column value, returning JobError::Decode on failure
    fn try_get_column<T>(&self, column: &str) -> JobResult<T>
    where
        T: for<'a> tokio_postgres::types::FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: &str) -> JobResult<T>
    where
        T: for<'a> tokio_postgres::types::FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| JobError::decode(column, e.to_string()))
    }
}
