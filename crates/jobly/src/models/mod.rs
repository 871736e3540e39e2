//! Job-board records and the operations on them.

mod company;
mod job;

pub use company::Company;
pub use job::{JOB_COLUMN_MAP, Job, JobFilter, JobListItem, JobPatch, JobWithCompany, NewJob};
