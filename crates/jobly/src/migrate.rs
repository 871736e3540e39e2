//! Schema migrations via [`refinery`].
//!
//! The `companies` and `jobs` tables live in `migrations/` and are embedded at
//! compile time.
//!
//! ```ignore
//! let pool = jobly::create_pool(&settings.database_url())?;
//! let report = jobly::migrate::run_pool(&pool).await?;
//! ```

use crate::error::JobResult;

pub use refinery::Report;

mod embedded {
    refinery::embed_migrations!("./migrations");
}

/// SQL of the initial schema, for callers that build throwaway schemas (tests).
pub const SCHEMA_SQL: &str = include_str!("../migrations/V1__jobly_schema.sql");

/// Run pending migrations on a single PostgreSQL connection.
pub async fn run(client: &mut tokio_postgres::Client) -> JobResult<Report> {
    let report = embedded::migrations::runner().run_async(client).await?;
    for m in report.applied_migrations() {
        tracing::info!(target: "jobly", version = m.version(), name = m.name(), "migration applied");
    }
    Ok(report)
}

/// Pool variant of [`run`].
#[cfg(feature = "pool")]
pub async fn run_pool(pool: &deadpool_postgres::Pool) -> JobResult<Report> {
    let mut client = pool.get().await?;
    run(&mut client).await
}
