//! Request-scoped identity and deadline.
//!
//! Every manager call receives a `RequestContext`; there is no process-wide
//! "current user".

use crate::error::{DormError, DormResult};
use crate::model::user::PrivilegeLevel;
use std::time::{Duration, Instant};

const ANONYMOUS_ACTOR: &str = "anonymous";

/// Caller identity and time budget for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    login: Option<String>,
    role: PrivilegeLevel,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Context for a caller that has not authenticated.
    pub fn anonymous() -> Self {
        Self {
            login: None,
            role: PrivilegeLevel::NonAuth,
            deadline: None,
        }
    }

    /// Context for a caller whose credentials were already verified.
    pub fn authenticated(login: impl Into<String>, role: PrivilegeLevel) -> Self {
        Self {
            login: Some(login.into()),
            role,
            deadline: None,
        }
    }

    /// Sets an absolute deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets a deadline relative to now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn login(&self) -> Option<&str> {
        self.login.as_deref()
    }

    /// Login for log lines; `anonymous` before authentication.
    pub fn actor(&self) -> &str {
        self.login.as_deref().unwrap_or(ANONYMOUS_ACTOR)
    }

    pub fn role(&self) -> PrivilegeLevel {
        self.role
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fails once the deadline has passed. Called before each store round trip.
    pub fn checkpoint(&self) -> DormResult<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(DormError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::anonymous()
    }
}
