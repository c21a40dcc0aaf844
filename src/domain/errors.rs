//! Domain errors for the Soar pipeline.
//!
//! The pipeline components themselves (relabel, validate, select, vote,
//! iterate) are total functions and never fail; non-eligibility and
//! invalidity are expressed through return values, not errors. `DomainError`
//! exists for the one fallible boundary: the external execution engine port.
//! Config loading has its own error type in `infrastructure::config`.

use thiserror::Error;

/// Domain-level errors that can occur at the Soar system boundaries.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Attempt source failed for task {task_id} at iteration {iteration}: {reason}")]
    AttemptSourceFailed {
        task_id: String,
        iteration: u32,
        reason: String,
    },
}

pub type DomainResult<T> = Result<T, DomainError>;
