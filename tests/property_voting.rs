//! Property-based tests over the pipeline's order- and scale-sensitive
//! pieces: canonical keys, vote weights, batch partitioning, and selection
//! bounds.

use std::collections::BTreeMap;

use proptest::prelude::*;

use soar::domain::models::config::{SelectionConfig, ValidationConfig};
use soar::domain::models::{AttemptRecord, CandidateOutput, CanonicalValue};
use soar::services::{
    calculate_vote_weight, ensemble_vote, normalize_output_key, ExampleSelector,
    HindsightRelabeler, SyntheticValidator,
};

fn failed_attempt(task_id: &str, accuracy: f64, output: CanonicalValue) -> AttemptRecord {
    AttemptRecord::new(
        task_id,
        "Triple the input",
        false,
        accuracy,
        "fn solve(input) { input * 3 }",
        output,
    )
    .with_input(CanonicalValue::from(5i64))
}

proptest! {
    /// Property: the canonical key ignores object key insertion order.
    #[test]
    fn prop_canonical_key_is_insertion_order_independent(
        entries in proptest::collection::vec(("[a-z]{1,8}", -1000i64..1000), 1..8)
    ) {
        let mut forward = BTreeMap::new();
        for (key, value) in &entries {
            forward.insert(key.clone(), CanonicalValue::from(*value));
        }
        let mut reversed = BTreeMap::new();
        for (key, value) in entries.iter().rev() {
            reversed.insert(key.clone(), CanonicalValue::from(*value));
        }

        prop_assert_eq!(
            normalize_output_key(&CanonicalValue::Object(forward)),
            normalize_output_key(&CanonicalValue::Object(reversed))
        );
    }

    /// Property: vote weight is strictly monotone in training accuracy and
    /// always at least 1.
    #[test]
    fn prop_vote_weight_monotone(a in 0.0f64..1.0, b in 0.0f64..1.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(calculate_vote_weight(lo) <= calculate_vote_weight(hi));
        prop_assert!(calculate_vote_weight(lo) >= 1.0);
    }

    /// Property: a voting pass accounts for every ballot and reports a
    /// confidence in [0, 1].
    #[test]
    fn prop_voting_accounts_for_every_ballot(
        outputs in proptest::collection::vec((0i64..5, 0.0f64..1.0), 1..30)
    ) {
        let candidates: Vec<CandidateOutput> = outputs
            .iter()
            .map(|&(value, accuracy)| CandidateOutput {
                output: CanonicalValue::from(value),
                program: "fn solve(input) { input }".to_string(),
                training_accuracy: accuracy,
            })
            .collect();

        let result = ensemble_vote(&candidates);
        prop_assert!(result.is_valid);
        prop_assert_eq!(result.total_votes, candidates.len());
        let grouped: usize = result.candidates.iter().map(|g| g.count).sum();
        prop_assert_eq!(grouped, candidates.len());
        prop_assert!(result.confidence >= 0.0 && result.confidence <= 1.0);
    }

    /// Property: validation partitions its input; nothing is dropped or
    /// duplicated.
    #[test]
    fn prop_validation_partitions_the_batch(
        accuracies in proptest::collection::vec(0.02f64..1.0, 0..20)
    ) {
        let relabeler = HindsightRelabeler::default();
        let validator = SyntheticValidator::new(ValidationConfig::default());

        let attempts: Vec<AttemptRecord> = accuracies
            .iter()
            .enumerate()
            .map(|(i, &accuracy)| {
                // Alternate healthy and degenerate (null-output) attempts.
                let output = if i % 2 == 0 {
                    CanonicalValue::from(15i64)
                } else {
                    CanonicalValue::Null
                };
                failed_attempt(&format!("task-{i}"), accuracy, output)
            })
            .collect();
        let total = attempts.len();

        let batch = validator.validate_batch(relabeler.relabel_batch(attempts));
        prop_assert_eq!(batch.total(), total);
    }

    /// Property: every selection strategy respects the top_k bound.
    #[test]
    fn prop_selection_is_bounded(
        count in 0usize..30,
        top_k in 1usize..10
    ) {
        let relabeler = HindsightRelabeler::default();
        let validator = SyntheticValidator::new(ValidationConfig::default());
        let selector = ExampleSelector::new(SelectionConfig {
            top_k,
            ..SelectionConfig::default()
        });

        let attempts: Vec<AttemptRecord> = (0..count)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let accuracy = 0.1 + 0.8 * (i as f64 / 30.0);
                failed_attempt(
                    &format!("task-{}", i % 3),
                    accuracy,
                    CanonicalValue::from(15i64),
                )
            })
            .collect();
        let batch = validator.validate_batch(relabeler.relabel_batch(attempts));

        prop_assert!(selector.select_top(&batch.valid).top_examples.len() <= top_k);
        prop_assert!(selector.select_greedy_diverse(&batch.valid).top_examples.len() <= top_k);
        prop_assert!(
            selector.select_with_task_balance(&batch.valid).top_examples.len() <= top_k
        );
    }
}
