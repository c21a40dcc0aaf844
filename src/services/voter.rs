//! Accuracy-weighted ensemble voting.
//!
//! Aggregates multiple candidate outputs for the same task into one winning
//! answer. Ballots are grouped by canonical output key and weighted by
//! `1 + 1000 * training_accuracy`; the large multiplier makes accuracy
//! dominate raw count, so a single high-accuracy vote can outweigh several
//! low-accuracy ones (accuracy 0.95 carries weight 951; two votes at 0.1
//! carry 2 x 101 = 202).
//!
//! The vote fails closed: fewer ballots than `min_votes` yields an invalid
//! result with no winner rather than a low-confidence guess.

use std::collections::HashMap;

use crate::domain::models::config::VotingConfig;
use crate::domain::models::{
    CandidateOutput, CanonicalValue, TieBreaker, Vote, VoteGroup, VotingResult,
};

/// Relative tolerance when comparing summed group weights. Float summation
/// order must not be able to split an exact tie.
const WEIGHT_EPSILON: f64 = 1e-9;

/// Aggregates candidate outputs into a single trusted answer.
#[derive(Debug, Clone, Default)]
pub struct EnsembleVoter {
    config: VotingConfig,
}

impl EnsembleVoter {
    /// Create a voter with the given configuration.
    pub fn new(config: VotingConfig) -> Self {
        Self { config }
    }

    /// Run a voting pass over the given ballots.
    ///
    /// Fails closed (`is_valid = false`, no winner) when fewer than
    /// `min_votes` ballots were cast. Otherwise the group with the maximum
    /// total weight wins; ties resolve per the configured [`TieBreaker`].
    /// `confidence` is the winning weight as a fraction of all weight cast.
    pub fn vote(&self, votes: &[Vote]) -> VotingResult {
        if votes.len() < self.config.min_votes {
            tracing::debug!(
                ballots = votes.len(),
                min_votes = self.config.min_votes,
                "vote failed closed: not enough ballots"
            );
            return VotingResult::invalid(votes.len());
        }

        let groups = group_votes(votes);
        if groups.is_empty() {
            return VotingResult::invalid(0);
        }
        let total_weight: f64 = groups.iter().map(|g| g.total_weight).sum();

        // First-seen order makes the scan deterministic; ties only move the
        // winner when the tie breaker says so.
        let mut best = 0usize;
        for (i, group) in groups.iter().enumerate().skip(1) {
            if weights_tied(group.total_weight, groups[best].total_weight) {
                if self.config.tie_breaker == TieBreaker::Count && group.count > groups[best].count
                {
                    best = i;
                }
            } else if group.total_weight > groups[best].total_weight {
                best = i;
            }
        }

        let winner = groups[best].sample_output.clone();
        let confidence = if total_weight > 0.0 {
            groups[best].total_weight / total_weight
        } else {
            0.0
        };

        let mut candidates = groups;
        candidates.sort_by(|a, b| {
            b.total_weight
                .partial_cmp(&a.total_weight)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        VotingResult {
            winner: Some(winner),
            confidence,
            is_valid: true,
            total_votes: votes.len(),
            candidates,
        }
    }
}

/// Canonicalize an output into its stable grouping key. Two outputs are
/// output-equal iff their keys match.
pub fn normalize_output_key(value: &CanonicalValue) -> String {
    value.canonical_key()
}

/// Ballot weight for a given training accuracy: `1 + 1000 * accuracy`.
pub fn calculate_vote_weight(training_accuracy: f64) -> f64 {
    1.0 + 1000.0 * training_accuracy
}

/// Map candidate outputs to ballots, 1:1. Duplicate outputs are *not*
/// merged here; merging happens in [`group_votes`].
pub fn create_votes(outputs: &[CandidateOutput]) -> Vec<Vote> {
    outputs
        .iter()
        .map(|candidate| Vote {
            output_key: normalize_output_key(&candidate.output),
            output: candidate.output.clone(),
            weight: calculate_vote_weight(candidate.training_accuracy),
            training_accuracy: candidate.training_accuracy,
            program: candidate.program.clone(),
        })
        .collect()
}

/// Sum weights and count occurrences per distinct canonical output.
///
/// Groups are returned in first-seen ballot order. The explicit index map
/// keeps the grouping O(n) without losing that order.
pub fn group_votes(votes: &[Vote]) -> Vec<VoteGroup> {
    let mut groups: Vec<VoteGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for vote in votes {
        if let Some(&i) = index.get(vote.output_key.as_str()) {
            groups[i].total_weight += vote.weight;
            groups[i].count += 1;
        } else {
            index.insert(vote.output_key.as_str(), groups.len());
            groups.push(VoteGroup {
                output_key: vote.output_key.clone(),
                total_weight: vote.weight,
                count: 1,
                sample_output: vote.output.clone(),
            });
        }
    }
    groups
}

/// One-shot voting pass with default configuration.
pub fn ensemble_vote(outputs: &[CandidateOutput]) -> VotingResult {
    EnsembleVoter::default().vote(&create_votes(outputs))
}

/// Whether two summed weights should be treated as tied.
fn weights_tied(a: f64, b: f64) -> bool {
    (a - b).abs() <= WEIGHT_EPSILON * a.abs().max(b.abs()).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(value: CanonicalValue, accuracy: f64) -> CandidateOutput {
        CandidateOutput {
            output: value,
            program: "fn solve(x) { x }".to_string(),
            training_accuracy: accuracy,
        }
    }

    #[test]
    fn test_weight_formula() {
        assert!((calculate_vote_weight(0.0) - 1.0).abs() < f64::EPSILON);
        assert!((calculate_vote_weight(0.95) - 951.0).abs() < f64::EPSILON);
        assert!((calculate_vote_weight(1.0) - 1001.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_create_votes_is_one_to_one() {
        let outputs = vec![
            output(CanonicalValue::from(42i64), 0.9),
            output(CanonicalValue::from(42i64), 0.8),
        ];
        let votes = create_votes(&outputs);
        assert_eq!(votes.len(), 2);
        assert_eq!(votes[0].output_key, votes[1].output_key);
        assert!((votes[0].weight - 901.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_group_votes_merges_by_key() {
        let votes = create_votes(&[
            output(CanonicalValue::from(42i64), 0.9),
            output(CanonicalValue::from(10i64), 0.3),
            output(CanonicalValue::from(42i64), 0.8),
        ]);
        let groups = group_votes(&votes);

        assert_eq!(groups.len(), 2);
        // First-seen order: 42 before 10.
        assert_eq!(groups[0].output_key, "42");
        assert_eq!(groups[0].count, 2);
        assert!((groups[0].total_weight - (901.0 + 801.0)).abs() < 1e-9);
        assert_eq!(groups[1].count, 1);
    }

    #[test]
    fn test_weighted_majority_wins() {
        let result = ensemble_vote(&[
            output(CanonicalValue::from(42i64), 0.9),
            output(CanonicalValue::from(42i64), 0.85),
            output(CanonicalValue::from(42i64), 0.8),
            output(CanonicalValue::from(10i64), 0.3),
        ]);

        assert!(result.is_valid);
        assert_eq!(result.winner, Some(CanonicalValue::from(42i64)));
        assert!(result.confidence > 0.5);
        assert_eq!(result.total_votes, 4);
    }

    #[test]
    fn test_unanimous_consensus() {
        let result = ensemble_vote(&[
            output(CanonicalValue::from("consensus"), 0.6),
            output(CanonicalValue::from("consensus"), 0.4),
            output(CanonicalValue::from("consensus"), 0.8),
        ]);

        assert_eq!(result.winner, Some(CanonicalValue::from("consensus")));
        assert!(result.confidence >= 0.9);
        assert!((result.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_vote_confidence_is_one() {
        let result = ensemble_vote(&[output(CanonicalValue::from(7i64), 0.2)]);
        assert!(result.is_valid);
        assert!((result.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_accuracy_dominates_count() {
        // 951 for "high" vs 2 x 101 = 202 for "low".
        let result = ensemble_vote(&[
            output(CanonicalValue::from("high"), 0.95),
            output(CanonicalValue::from("low"), 0.1),
            output(CanonicalValue::from("low"), 0.1),
        ]);

        assert_eq!(result.winner, Some(CanonicalValue::from("high")));
    }

    #[test]
    fn test_tie_break_by_count() {
        // A: one ballot at 501. B: two ballots at 250.5 each, also 501.
        let voter = EnsembleVoter::new(VotingConfig {
            min_votes: 1,
            tie_breaker: TieBreaker::Count,
        });
        let votes = create_votes(&[
            output(CanonicalValue::from("A"), 0.5),
            output(CanonicalValue::from("B"), 0.2495),
            output(CanonicalValue::from("B"), 0.2495),
        ]);

        let result = voter.vote(&votes);
        assert_eq!(result.winner, Some(CanonicalValue::from("B")));
    }

    #[test]
    fn test_tie_break_first_seen_keeps_earliest() {
        let voter = EnsembleVoter::new(VotingConfig {
            min_votes: 1,
            tie_breaker: TieBreaker::FirstSeen,
        });
        let votes = create_votes(&[
            output(CanonicalValue::from("A"), 0.5),
            output(CanonicalValue::from("B"), 0.2495),
            output(CanonicalValue::from("B"), 0.2495),
        ]);

        let result = voter.vote(&votes);
        assert_eq!(result.winner, Some(CanonicalValue::from("A")));
    }

    #[test]
    fn test_equal_accuracy_majority_by_count_via_weight() {
        // Same accuracy everywhere, so weight reduces to count.
        let result = ensemble_vote(&[
            output(CanonicalValue::from("A"), 0.5),
            output(CanonicalValue::from("B"), 0.5),
            output(CanonicalValue::from("B"), 0.5),
        ]);
        assert_eq!(result.winner, Some(CanonicalValue::from("B")));
    }

    #[test]
    fn test_empty_vote_fails_closed() {
        let voter = EnsembleVoter::new(VotingConfig {
            min_votes: 1,
            tie_breaker: TieBreaker::Count,
        });
        let result = voter.vote(&[]);

        assert!(!result.is_valid);
        assert!(result.winner.is_none());
        assert_eq!(result.total_votes, 0);
    }

    #[test]
    fn test_min_votes_threshold() {
        let voter = EnsembleVoter::new(VotingConfig {
            min_votes: 3,
            tie_breaker: TieBreaker::Count,
        });
        let votes = create_votes(&[
            output(CanonicalValue::from(1i64), 0.9),
            output(CanonicalValue::from(1i64), 0.9),
        ]);

        assert!(!voter.vote(&votes).is_valid);
    }

    #[test]
    fn test_candidates_sorted_descending_by_weight() {
        let result = ensemble_vote(&[
            output(CanonicalValue::from("low"), 0.1),
            output(CanonicalValue::from("high"), 0.9),
            output(CanonicalValue::from("mid"), 0.5),
        ]);

        let weights: Vec<f64> = result.candidates.iter().map(|g| g.total_weight).collect();
        assert!(weights.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(result.candidates[0].output_key, "\"high\"");
    }

    #[test]
    fn test_object_outputs_group_across_key_order() {
        let mut left = std::collections::BTreeMap::new();
        left.insert("a".to_string(), CanonicalValue::from(1i64));
        left.insert("b".to_string(), CanonicalValue::from(2i64));
        let mut right = std::collections::BTreeMap::new();
        right.insert("b".to_string(), CanonicalValue::from(2i64));
        right.insert("a".to_string(), CanonicalValue::from(1i64));

        let result = ensemble_vote(&[
            output(CanonicalValue::Object(left), 0.4),
            output(CanonicalValue::Object(right), 0.4),
        ]);

        assert_eq!(result.candidates.len(), 1);
        assert!((result.confidence - 1.0).abs() < f64::EPSILON);
    }
}
