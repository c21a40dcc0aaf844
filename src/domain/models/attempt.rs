//! Attempt records produced by the external execution engine.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value::CanonicalValue;

/// One execution result from the external engine.
///
/// Immutable once created; owned by the caller and consumed by-value by the
/// pipeline. `training_accuracy` is the engine's own measurement of how well
/// the attempt's program performed on the original task's training pairs --
/// the pipeline never recomputes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Unique identifier for this attempt.
    pub id: Uuid,

    /// The task this attempt was made against.
    pub task_id: String,

    /// Human-readable description of the original task.
    pub task_description: String,

    /// Whether the attempt solved the original task.
    pub success: bool,

    /// Training accuracy in `[0, 1]` as measured by the engine.
    pub training_accuracy: f64,

    /// The program source the attempt executed.
    pub code: String,

    /// The example input the program was run against. Used by relabeling to
    /// build the synthetic task and by validation's identity/lookup checks.
    pub task_input: CanonicalValue,

    /// What the program actually produced.
    pub actual_output: CanonicalValue,
}

impl AttemptRecord {
    /// Create a new attempt record with an auto-generated ID.
    pub fn new(
        task_id: impl Into<String>,
        task_description: impl Into<String>,
        success: bool,
        training_accuracy: f64,
        code: impl Into<String>,
        actual_output: CanonicalValue,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id: task_id.into(),
            task_description: task_description.into(),
            success,
            training_accuracy,
            code: code.into(),
            task_input: CanonicalValue::Null,
            actual_output,
        }
    }

    /// Attach the example input the program was run against.
    pub fn with_input(mut self, task_input: CanonicalValue) -> Self {
        self.task_input = task_input;
        self
    }
}

/// Skill usage statistics correlated with a batch of attempts.
///
/// Produced by the execution engine and passed through the pipeline
/// unmodified for downstream reporting. Nothing in this crate inspects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillContext {
    /// Name of the skill the engine exercised.
    pub skill_name: String,

    /// How many times the skill was invoked across the session.
    pub invocations: u64,

    /// How many invocations the engine judged successful.
    pub successes: u64,
}
