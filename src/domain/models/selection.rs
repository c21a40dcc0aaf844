//! Selection results: bounded top/bottom subsets of validated synthetics.

use serde::{Deserialize, Serialize};

use super::synthetic::SyntheticTaskSolution;

/// A selected synthetic tagged with its rank and score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedExample {
    /// The selected synthetic.
    pub solution: SyntheticTaskSolution,

    /// 1-based rank; 1 is best.
    pub rank: usize,

    /// The score the selector ranked this example by. For plain top/bottom
    /// selection this is the quality score; greedy-diverse selection blends
    /// quality with dissimilarity to already-selected examples.
    pub selection_score: f64,
}

/// Result of a selection pass. Derived and read-only; recomputed per call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionResult {
    /// Best examples, rank 1 first.
    pub top_examples: Vec<SelectedExample>,

    /// Worst examples, rank 1 first (rank 1 = worst for the bottom pass).
    pub bottom_examples: Vec<SelectedExample>,

    /// How many candidates were considered. Always equals the input length.
    pub total_candidates: usize,
}
