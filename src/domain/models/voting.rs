//! Ballot and tally types for ensemble voting.

use serde::{Deserialize, Serialize};

use super::value::CanonicalValue;

/// An unweighted candidate output, as handed over by the caller.
///
/// `create_votes` turns each of these into one [`Vote`] (a direct 1:1
/// mapping, no merging).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateOutput {
    /// The output a program produced.
    pub output: CanonicalValue,

    /// Provenance: the program that produced it.
    pub program: String,

    /// Training accuracy of the producing attempt.
    pub training_accuracy: f64,
}

/// One ballot for a candidate output instance.
///
/// Duplicates with identical output are *not* pre-merged; merging happens
/// inside the voter's grouping step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    /// Canonical key of `output`; the grouping key.
    pub output_key: String,

    /// The candidate output itself.
    pub output: CanonicalValue,

    /// Accuracy-derived ballot weight.
    pub weight: f64,

    /// Raw training accuracy the weight was derived from.
    pub training_accuracy: f64,

    /// Provenance: the program that produced this output.
    pub program: String,
}

/// Merged tally for one distinct canonical output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteGroup {
    /// Canonical key shared by every ballot in this group.
    pub output_key: String,

    /// Sum of ballot weights.
    pub total_weight: f64,

    /// Number of raw ballots.
    pub count: usize,

    /// A representative output for the group (first ballot's).
    pub sample_output: CanonicalValue,
}

/// How to resolve groups that tie on total weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreaker {
    /// Pick the tied group with more raw ballots.
    #[default]
    Count,
    /// Keep the tied group whose first ballot arrived earliest.
    FirstSeen,
}

/// Outcome of a voting pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingResult {
    /// The winning output, or `None` when the vote failed closed.
    pub winner: Option<CanonicalValue>,

    /// Winning weight as a fraction of all weight cast, in `[0, 1]`.
    pub confidence: f64,

    /// Whether the vote produced a usable winner.
    pub is_valid: bool,

    /// Number of raw ballots cast.
    pub total_votes: usize,

    /// Every group, sorted descending by total weight.
    pub candidates: Vec<VoteGroup>,
}

impl VotingResult {
    /// A failed-closed result: no winner, zero confidence.
    pub fn invalid(total_votes: usize) -> Self {
        Self {
            winner: None,
            confidence: 0.0,
            is_valid: false,
            total_votes,
            candidates: Vec::new(),
        }
    }

    /// Weight gap between the winning group and the runner-up, as a
    /// fraction of total weight. `1.0` when unopposed; `0.0` when invalid.
    pub fn margin(&self) -> f64 {
        if !self.is_valid || self.candidates.is_empty() {
            return 0.0;
        }
        let total: f64 = self.candidates.iter().map(|g| g.total_weight).sum();
        if total <= 0.0 {
            return 0.0;
        }
        let winner = self.candidates[0].total_weight;
        let runner_up = self.candidates.get(1).map_or(0.0, |g| g.total_weight);
        (winner - runner_up) / total
    }
}
