//! Capability check gating the job operations.
//!
//! Authentication happens elsewhere; this module only answers whether an
//! already-identified caller may run an operation.

use crate::error::{JobError, JobResult};

/// A privilege a caller may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Admin,
}

/// The job operations exposed to a boundary layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    FindAll,
    Get,
    Update,
    Delete,
}

impl Operation {
    /// Capability needed to run this operation, if any.
    pub fn required_capability(self) -> Option<Capability> {
        match self {
            Self::Create | Self::Update | Self::Delete => Some(Capability::Admin),
            Self::FindAll | Self::Get => None,
        }
    }
}

/// Whoever is invoking an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    pub username: Option<String>,
    pub is_admin: bool,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            is_admin: false,
        }
    }

    pub fn admin(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            is_admin: true,
        }
    }

    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Admin => self.is_admin,
        }
    }
}

/// Fail with `Unauthorized` unless `caller` may run `op`.
pub fn authorize(caller: &Caller, op: Operation) -> JobResult<()> {
    match op.required_capability() {
        Some(cap) if !caller.has(cap) => {
            tracing::debug!(target: "jobly", ?op, user = ?caller.username, "capability check failed");
            Err(JobError::Unauthorized(format!("{op:?} requires {cap:?}")))
        }
        _ => Ok(()),
    }
}
