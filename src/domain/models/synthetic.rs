//! Synthetic tasks manufactured by hindsight relabeling, and the validation
//! verdicts over them.
//!
//! A **synthetic task** is a task the system invented rather than a human
//! authored: the attempt that failed task A nonetheless correctly
//! demonstrates *some* task B -- the one whose answer is what the attempt
//! produced. [`SyntheticTaskSolution`] pairs that invented task with the
//! attempt's code as its known-good solution.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value::CanonicalValue;

/// A task manufactured by hindsight relabeling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticTask {
    /// The original task the source attempt was made against.
    pub original_task_id: String,

    /// The example input carried over from the source attempt.
    pub input: CanonicalValue,

    /// The correct answer for this synthetic task -- the source attempt's
    /// actual (wrong, for the original task) output.
    pub output: CanonicalValue,

    /// Human-readable description derived from the original task's.
    pub description: String,
}

/// A synthetic task together with its known-good solution.
///
/// Derived from exactly one eligible attempt and never mutated after
/// creation. `quality_score` is always the source attempt's
/// `training_accuracy`, copied verbatim and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticTaskSolution {
    /// The invented task.
    pub task: SyntheticTask,

    /// The solution program (copy of the source attempt's code).
    pub solution: String,

    /// Inherited training accuracy of the source attempt.
    pub quality_score: f64,

    /// The attempt this synthetic was derived from.
    pub source_attempt_id: Uuid,
}

/// One of the independent degeneracy checks run by the validator.
///
/// All checks must pass for a synthetic to be valid; a failed verdict lists
/// exactly which checks rejected it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCheck {
    /// Output must be above a structural floor (rejects e.g. two-character
    /// string outputs).
    NonTrivialOutput,
    /// Solution must not be a no-op passthrough of its input.
    NonIdentity,
    /// Source code must exceed a minimum structural complexity.
    CodeComplexity,
    /// Solution must not merely special-case the exact input.
    NotLookupTable,
    /// Output must carry enough information content.
    OutputEntropy,
}

/// Verdict for a single synthetic task solution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// The synthetic that was checked.
    pub solution: SyntheticTaskSolution,

    /// Whether every check passed.
    pub valid: bool,

    /// The checks that rejected this synthetic; empty when `valid`.
    pub failed_checks: Vec<ValidationCheck>,
}

/// Total partition of a batch of synthetics into valid and invalid buckets.
///
/// Every input lands in exactly one bucket:
/// `valid.len() + invalid.len()` equals the input length, always.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationBatch {
    /// Synthetics that passed every check, in input order.
    pub valid: Vec<SyntheticTaskSolution>,

    /// Verdicts for synthetics that failed at least one check, in input order.
    pub invalid: Vec<ValidationResult>,
}

impl ValidationBatch {
    /// Total number of synthetics that went through validation.
    pub fn total(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }

    /// Fraction of the batch that validated, or `0.0` for an empty batch.
    #[allow(clippy::cast_precision_loss)]
    pub fn acceptance_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.valid.len() as f64 / self.total() as f64
        }
    }
}
