//! Error kinds for the Schedule Construction & Compliance Engine.
//!
//! Every error carries a stable machine code (`code()`) and a human message
//! free of PII. Constraint violations surfaced during validation are
//! *values* (`crate::constraints::Violation`), never errors —
//! `ConstraintViolation` here only wraps the aggregate when a caller asked
//! for strict-mode enforcement (e.g. the batch pipeline).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SccError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid: {0}")]
    Invalid(String),

    #[error("{} constraint violation(s)", .0.len())]
    ConstraintViolation(Vec<crate::constraints::Violation>),

    #[error("infeasible: {reason}")]
    Infeasible {
        reason: String,
        minimal_core: Vec<String>,
        suggestions: Vec<String>,
    },

    #[error("timeout after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl SccError {
    /// Stable machine code, safe to surface to callers (never PII).
    pub fn code(&self) -> &'static str {
        match self {
            SccError::NotFound(_) => "E_NOT_FOUND",
            SccError::Conflict(_) => "E_CONFLICT_OPTIMISTIC_LOCK",
            SccError::Invalid(_) => "E_INVALID",
            SccError::ConstraintViolation(_) => "E_CONSTRAINT_VIOLATION",
            SccError::Infeasible { .. } => "E_INFEASIBLE",
            SccError::Timeout { .. } => "E_TIMEOUT",
            SccError::Unavailable(_) => "E_UNAVAILABLE",
            SccError::Internal(_) => "E_INTERNAL",
        }
    }
}

pub type SccResult<T> = Result<T, SccError>;
