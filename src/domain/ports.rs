//! Ports to external collaborators.
//!
//! The agent/LLM execution engine that produces attempts is out of scope for
//! this crate; the pipeline only consumes its results. [`AttemptSource`] is
//! the single seam: the TTT session loop awaits it at the iteration boundary
//! and nowhere else, so a caller may cancel a session between iterations
//! without corrupting state.

use async_trait::async_trait;

use super::errors::DomainResult;
use super::models::{AttemptRecord, SkillContext};

/// Source of task attempts, implemented by the external execution engine.
///
/// One call per TTT iteration. The pipeline never retries or rate-limits
/// this port; failure semantics belong to the implementor.
#[async_trait]
pub trait AttemptSource: Send + Sync {
    /// Produce the next batch of attempts for the given task.
    ///
    /// # Arguments
    /// * `task_id` - The task being attempted
    /// * `iteration` - The 0-indexed iteration about to run
    ///
    /// # Returns
    /// * `Ok(attempts)` - May be empty; an empty round is a normal outcome
    /// * `Err(DomainError)` - Engine failure, surfaced to the session caller
    async fn next_batch(&self, task_id: &str, iteration: u32)
        -> DomainResult<Vec<AttemptRecord>>;

    /// Skill usage statistics correlated with the attempts, if the engine
    /// tracks them. Passed through unmodified for downstream reporting.
    async fn skill_context(&self, _task_id: &str) -> DomainResult<Option<SkillContext>> {
        Ok(None)
    }
}
