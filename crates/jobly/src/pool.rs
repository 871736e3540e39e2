//! Connection pool utilities

use crate::config::Settings;
use crate::error::{JobError, JobResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

/// Create a connection pool from a database URL.
///
/// Uses `NoTls` and a max size of 16.
///
/// # Example
///
/// ```ignore
/// let pool = jobly::create_pool("postgresql:///jobly")?;
/// let client = pool.get().await?;
/// ```
pub fn create_pool(database_url: &str) -> JobResult<Pool> {
    create_pool_with_config(database_url, 16)
}

/// Create a connection pool with custom configuration
pub fn create_pool_with_config(database_url: &str, max_size: usize) -> JobResult<Pool> {
    let pg_config: tokio_postgres::Config = database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| JobError::Connection(e.to_string()))?;

    let manager_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };
    let mgr = Manager::from_config(pg_config, NoTls, manager_config);
    Pool::builder(mgr)
        .max_size(max_size)
        .build()
        .map_err(|e| JobError::Pool(e.to_string()))
}

/// Create a pool from loaded [`Settings`].
pub fn create_pool_from_settings(settings: &Settings) -> JobResult<Pool> {
    let url = settings.database_url();
    tracing::debug!(
        target: "jobly",
        max_connections = settings.database.max_connections,
        "creating connection pool"
    );
    create_pool_with_config(&url, settings.database.max_connections)
}
