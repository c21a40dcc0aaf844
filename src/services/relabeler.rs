//! Hindsight relabeling of failed attempts.
//!
//! Hindsight Experience Replay applied to coding attempts: an attempt that
//! failed task A nonetheless correctly demonstrates *some* task B -- the one
//! whose correct answer is what the attempt actually produced. The relabeler
//! converts each eligible failed attempt into a [`SyntheticTaskSolution`]
//! whose target output is the attempt's own output, so failures still
//! produce usable training signal.
//!
//! Eligibility is deliberately narrow: succeeded attempts carry no hindsight
//! signal (the original task already covers them), and attempts below the
//! accuracy floor are noise rather than signal.

use crate::domain::models::config::RelabelConfig;
use crate::domain::models::{AttemptRecord, SyntheticTask, SyntheticTaskSolution};

/// Converts failed attempts into synthetic training tasks.
#[derive(Debug, Clone, Default)]
pub struct HindsightRelabeler {
    config: RelabelConfig,
}

impl HindsightRelabeler {
    /// Create a relabeler with the given thresholds.
    pub fn new(config: RelabelConfig) -> Self {
        Self { config }
    }

    /// Whether an attempt is worth relabeling.
    ///
    /// True iff the attempt failed its original task AND its training
    /// accuracy clears the configured floor.
    pub fn is_suitable_for_relabeling(&self, attempt: &AttemptRecord) -> bool {
        !attempt.success && attempt.training_accuracy >= self.config.min_accuracy
    }

    /// Relabel one attempt into a synthetic task solution.
    ///
    /// Returns `None` when the attempt is unsuitable. The synthetic's
    /// `quality_score` is the attempt's `training_accuracy`, copied
    /// verbatim and never recomputed.
    pub fn relabel_attempt(&self, attempt: AttemptRecord) -> Option<SyntheticTaskSolution> {
        if !self.is_suitable_for_relabeling(&attempt) {
            tracing::debug!(
                attempt_id = %attempt.id,
                success = attempt.success,
                training_accuracy = attempt.training_accuracy,
                "skipping attempt unsuitable for relabeling"
            );
            return None;
        }

        let description = generate_synthetic_description(&attempt.task_description);
        Some(SyntheticTaskSolution {
            task: SyntheticTask {
                original_task_id: attempt.task_id,
                input: attempt.task_input,
                output: attempt.actual_output,
                description,
            },
            solution: attempt.code,
            quality_score: attempt.training_accuracy,
            source_attempt_id: attempt.id,
        })
    }

    /// Relabel a batch, dropping unsuitable attempts.
    ///
    /// Input order is preserved among the kept results.
    pub fn relabel_batch(&self, attempts: Vec<AttemptRecord>) -> Vec<SyntheticTaskSolution> {
        let total = attempts.len();
        let synthetics: Vec<SyntheticTaskSolution> = attempts
            .into_iter()
            .filter_map(|attempt| self.relabel_attempt(attempt))
            .collect();
        tracing::debug!(
            total,
            relabeled = synthetics.len(),
            "hindsight relabeling complete"
        );
        synthetics
    }
}

/// Derive a human-readable synthetic task description from the original
/// task's. Pure string transform.
pub fn generate_synthetic_description(original: &str) -> String {
    let trimmed = original.trim();
    if trimmed.is_empty() {
        "Reproduce the observed output of an unnamed task".to_string()
    } else {
        format!("Reproduce the observed output for: {trimmed}")
    }
}
