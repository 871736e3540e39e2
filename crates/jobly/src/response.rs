//! JSON envelopes a boundary layer wraps results in.
//!
//! ```text
//! create/get/update  => { "job": {...} }
//! find_all           => { "jobs": [...] }
//! delete             => { "deleted": id }
//! error              => { "error": { "message": ..., "status": ... } }
//! ```

use serde::Serialize;
use serde_json::{Value, json};

use crate::error::JobError;

pub fn job<T: Serialize>(job: &T) -> serde_json::Result<Value> {
    Ok(json!({ "job": serde_json::to_value(job)? }))
}

pub fn jobs<T: Serialize>(jobs: &[T]) -> serde_json::Result<Value> {
    Ok(json!({ "jobs": serde_json::to_value(jobs)? }))
}

pub fn deleted(id: i32) -> Value {
    json!({ "deleted": id })
}

pub fn error(err: &JobError) -> Value {
    let mut body = json!({
        "message": err.to_string(),
        "status": err.status_code(),
    });
    if let JobError::Validation(errs) = err {
        body["errors"] = json!(errs);
    }
    json!({ "error": body })
}
