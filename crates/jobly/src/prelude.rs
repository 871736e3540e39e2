//! Convenient imports for typical `jobly` usage.
//!
//! ```ignore
//! use jobly::prelude::*;
//! ```

pub use crate::{
    Caller, GenericClient, Job, JobError, JobFilter, JobPatch, JobResult, LoggedClient, NewJob,
    Settings, authorize,
};

#[cfg(feature = "pool")]
pub use crate::{create_pool, create_pool_from_settings};
