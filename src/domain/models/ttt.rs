//! Test-time training session state.
//!
//! A **TTT session** iteratively regenerates attempts at inference time
//! until a stopping criterion is met: satisfaction, stagnation, or the
//! iteration cap. [`TttState`] is modeled as an immutable value -- the
//! controller's `process_iteration` consumes the old state and returns a new
//! one, so the history is append-only and snapshot-consistent at every
//! iteration boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value::CanonicalValue;
use crate::domain::models::SkillContext;

/// State of one TTT session. Owned by exactly one session; never shared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TttState {
    /// Number of completed iterations.
    pub current_iteration: u32,

    /// Best round accuracy observed so far.
    pub best_accuracy: f64,

    /// Code of the attempt that achieved `best_accuracy`.
    pub best_solution: String,

    /// Append-only record of every completed iteration, in strict order.
    pub iteration_history: Vec<TttIterationResult>,
}

impl TttState {
    /// Fresh session state: iteration 0, zero accuracy, empty history.
    pub fn new() -> Self {
        Self {
            current_iteration: 0,
            best_accuracy: 0.0,
            best_solution: String::new(),
            iteration_history: Vec::new(),
        }
    }

    /// The most recent `window` iteration results, oldest first.
    /// Empty when fewer than `window` iterations have completed.
    pub fn recent_window(&self, window: usize) -> &[TttIterationResult] {
        if self.iteration_history.len() < window {
            return &[];
        }
        &self.iteration_history[self.iteration_history.len() - window..]
    }
}

impl Default for TttState {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable record of one completed TTT iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TttIterationResult {
    /// 1-based iteration number.
    pub iteration: u32,

    /// Session-best accuracy as of the end of this iteration.
    pub best_accuracy: f64,

    /// Mean training accuracy across this round's attempts.
    pub average_accuracy: f64,

    /// How many attempts the round consumed.
    pub attempt_count: usize,

    /// How many synthetics survived validation this round.
    pub synthetic_count: usize,

    /// Session-best solution as of the end of this iteration.
    pub best_solution: String,

    /// Whether this round improved on the previous session best by at least
    /// the configured minimum margin. Sub-threshold gains still move the
    /// session best but leave this false.
    pub improved: bool,

    /// When this iteration completed.
    pub completed_at: DateTime<Utc>,
}

/// Why a session stopped iterating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Best accuracy reached the satisfaction threshold.
    Satisfied,
    /// The most recent consecutive iterations all failed to improve.
    Stagnated,
    /// The iteration cap was reached.
    MaxIterations,
}

/// Final output of a TTT session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TttSessionResult {
    /// The task the session was run for.
    pub task_id: String,

    /// Winner of the final voting pass, if the vote was valid.
    pub final_prediction: Option<CanonicalValue>,

    /// How many iterations the session completed.
    pub iterations_completed: u32,

    /// Best round accuracy observed across the session.
    pub best_accuracy: f64,

    /// Why the session stopped, if a stop criterion fired.
    pub stop_reason: Option<StopReason>,

    /// Engine-provided skill statistics, passed through unmodified.
    pub skill_context: Option<SkillContext>,
}
