//! # jobly
//!
//! Job-board persistence over PostgreSQL.
//!
//! ## Features
//!
//! - **Explicit SQL**: statements are written by hand and composed with [`Sql`]
//! - **Partial updates**: [`sql_for_partial_update`] turns the present fields of a
//!   patch into a positional `SET` clause
//! - **Filtered listings**: [`JobFilter`] composes `WHERE ... AND ...` predicates
//!   with bound parameters only
//! - **Transaction-friendly**: every operation takes `&impl GenericClient`
//! - **Logging**: [`LoggedClient`] traces each statement via `tracing`
//!
//! ## Example
//!
//! ```ignore
//! use jobly::prelude::*;
//!
//! let settings = Settings::load(None)?;
//! let pool = create_pool_from_settings(&settings)?;
//! let client = pool.get().await?;
//!
//! let job = Job::create(&client, NewJob::new("Engineer", "acme").salary(120_000)).await?;
//! let patch = JobPatch { salary: Some(Some(130_000)), ..Default::default() };
//! let job = Job::update(&client, job.id, patch).await?;
//!
//! let filter = JobFilter { has_equity: Some(true), ..Default::default() };
//! let listed = Job::find_all(&client, &filter).await?;
//! ```

pub mod auth;
pub mod client;
pub mod condition;
pub mod config;
pub mod error;
pub mod models;
pub mod monitor;
pub mod partial_update;
pub mod prelude;
pub mod response;
pub mod row;
pub mod sql;
pub mod validate;

pub use auth::{Caller, Capability, Operation, authorize};
pub use client::GenericClient;
pub use condition::{Condition, Op};
pub use config::Settings;
pub use error::{ErrorKind, JobError, JobResult};
pub use models::{
    Company, JOB_COLUMN_MAP, Job, JobFilter, JobListItem, JobPatch, JobWithCompany, NewJob,
};
pub use monitor::LoggedClient;
pub use partial_update::{ColumnMap, FieldMap, PartialUpdate, sql_for_partial_update};
pub use row::{FromRow, RowExt};
pub use sql::{Sql, SqlParam, sql};
pub use validate::{ValidationCode, ValidationError, ValidationErrors};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_from_settings, create_pool_with_config};

#[cfg(feature = "migrate")]
pub mod migrate;
