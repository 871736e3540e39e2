//! `tracing`-based SQL logging around any [`GenericClient`].
//!
//! ```ignore
//! use jobly::{Job, JobFilter, LoggedClient};
//!
//! let conn = LoggedClient::new(pool.get().await?).max_sql_length(120);
//! let jobs = Job::find_all(&conn, &JobFilter::default()).await?;
//! ```
//!
//! Events go to the `jobly.sql` target: the statement before it runs, then its
//! outcome and duration.

use crate::client::GenericClient;
use crate::error::JobResult;
use std::time::{Duration, Instant};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::Level;

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// A client wrapper that logs every statement it forwards.
#[derive(Debug, Clone)]
pub struct LoggedClient<C> {
    client: C,
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl<C: GenericClient> LoggedClient<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub fn inner(&self) -> &C {
        &self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }

    fn display_sql(&self, sql: &str) -> String {
        let sql = sql.split_whitespace().collect::<Vec<_>>().join(" ");
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(&sql, max)),
            _ => sql,
        }
    }

    fn before(&self, sql: &str, param_count: usize) {
        let sql = self.display_sql(sql);
        emit_at_level!(self.level, target: "jobly.sql", param_count, sql = %sql, "executing");
    }

    fn after<T>(&self, result: &JobResult<T>, elapsed: Duration, rows: impl FnOnce(&T) -> u64) {
        match result {
            Ok(v) => emit_at_level!(
                self.level,
                target: "jobly.sql",
                rows = rows(v),
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                "done"
            ),
            Err(e) => tracing::warn!(
                target: "jobly.sql",
                error = %e,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                "statement failed"
            ),
        }
    }
}

impl<C: GenericClient> GenericClient for LoggedClient<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JobResult<Vec<Row>> {
        self.before(sql, params.len());
        let start = Instant::now();
        let result = self.client.query(sql, params).await;
        self.after(&result, start.elapsed(), |rows| rows.len() as u64);
        result
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JobResult<u64> {
        self.before(sql, params.len());
        let start = Instant::now();
        let result = self.client.execute(sql, params).await;
        self.after(&result, start.elapsed(), |n| *n);
        result
    }
}
