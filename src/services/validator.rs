//! Validation of synthetic task solutions.
//!
//! Hindsight relabeling is deliberately permissive; validation is where
//! degenerate signal dies. Five independent heuristic checks run against
//! every synthetic, and all must pass. The checks are heuristics over the
//! canonical forms -- they trade a few false negatives for never letting a
//! constant output or a memorized input/output pair masquerade as a
//! learnable task.
//!
//! `validate_batch` is a total partition: every input lands in exactly one
//! bucket and the function never fails.

use std::collections::HashMap;

use crate::domain::models::config::ValidationConfig;
use crate::domain::models::{
    CanonicalValue, SyntheticTaskSolution, ValidationBatch, ValidationCheck, ValidationResult,
};

/// Rejects synthetic tasks that are trivial, degenerate, or not genuinely
/// learnable.
#[derive(Debug, Clone, Default)]
pub struct SyntheticValidator {
    config: ValidationConfig,
}

impl SyntheticValidator {
    /// Create a validator with the given heuristics configuration.
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Run every check against one synthetic.
    pub fn validate_synthetic(&self, solution: SyntheticTaskSolution) -> ValidationResult {
        let mut failed_checks = Vec::new();

        if !self.has_non_trivial_output(&solution.task.output) {
            failed_checks.push(ValidationCheck::NonTrivialOutput);
        }
        if !is_non_identity(&solution) {
            failed_checks.push(ValidationCheck::NonIdentity);
        }
        if !self.has_code_complexity(&solution.solution) {
            failed_checks.push(ValidationCheck::CodeComplexity);
        }
        if is_lookup_table(&solution) {
            failed_checks.push(ValidationCheck::NotLookupTable);
        }
        if !self.has_output_entropy(&solution.task.output) {
            failed_checks.push(ValidationCheck::OutputEntropy);
        }

        ValidationResult {
            valid: failed_checks.is_empty(),
            failed_checks,
            solution,
        }
    }

    /// Partition a batch into valid and invalid buckets.
    ///
    /// Total: `valid.len() + invalid.len()` always equals the input length.
    pub fn validate_batch(&self, synthetics: Vec<SyntheticTaskSolution>) -> ValidationBatch {
        let mut batch = ValidationBatch::default();
        for synthetic in synthetics {
            let result = self.validate_synthetic(synthetic);
            if result.valid {
                batch.valid.push(result.solution);
            } else {
                batch.invalid.push(result);
            }
        }
        tracing::debug!(
            valid = batch.valid.len(),
            invalid = batch.invalid.len(),
            acceptance_rate = batch.acceptance_rate(),
            "synthetic validation complete"
        );
        batch
    }

    /// Output must be above a structural floor. Numbers and booleans pass
    /// here (entropy governs degenerate repeats); strings need a minimum
    /// length, containers must be non-empty, and null never qualifies.
    fn has_non_trivial_output(&self, output: &CanonicalValue) -> bool {
        match output {
            CanonicalValue::Null => false,
            CanonicalValue::Bool(_) | CanonicalValue::Number(_) => true,
            CanonicalValue::String(s) => s.chars().count() >= self.config.min_output_chars,
            CanonicalValue::Array(_) | CanonicalValue::Object(_) => output.structural_size() > 1,
        }
    }

    /// Code must carry at least a few tokens; single-token bodies are not a
    /// program worth learning from.
    fn has_code_complexity(&self, code: &str) -> bool {
        code_tokens(code).len() >= self.config.min_code_tokens
    }

    /// Shannon char entropy of the output must clear the floor, once the
    /// text is long enough for repetition to be meaningful. Short outputs
    /// are governed by the non-trivial check instead. Strings are measured
    /// on their raw content so the canonical quoting does not inflate the
    /// distribution.
    fn has_output_entropy(&self, output: &CanonicalValue) -> bool {
        let text = match output {
            CanonicalValue::String(s) => s.clone(),
            other => other.canonical_key(),
        };
        if text.chars().count() < self.config.entropy_min_key_len {
            return true;
        }
        char_entropy(&text) >= self.config.min_output_entropy
    }
}

/// Solution must not be a no-op passthrough: the synthetic's output and
/// input must differ in canonical form.
fn is_non_identity(solution: &SyntheticTaskSolution) -> bool {
    solution.task.output.canonical_key() != solution.task.input.canonical_key()
}

/// Heuristic lookup-table detection: the code embeds both the exact
/// canonical input and the exact canonical output as literals, i.e. the
/// special-case-the-input pattern.
fn is_lookup_table(solution: &SyntheticTaskSolution) -> bool {
    if solution.task.input.is_null() {
        return false;
    }
    let input_key = solution.task.input.canonical_key();
    let output_key = solution.task.output.canonical_key();
    solution.solution.contains(&input_key) && solution.solution.contains(&output_key)
}

/// Alphanumeric tokens of a code string (identifiers, keywords, numbers).
fn code_tokens(code: &str) -> Vec<&str> {
    code.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| !t.is_empty())
        .collect()
}

/// Shannon entropy in bits over the character distribution of `s`.
#[allow(clippy::cast_precision_loss)]
fn char_entropy(s: &str) -> f64 {
    let mut counts: HashMap<char, usize> = HashMap::new();
    let mut total = 0usize;
    for c in s.chars() {
        *counts.entry(c).or_insert(0) += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }
    counts
        .values()
        .map(|&count| {
            let p = count as f64 / total as f64;
            -p * p.log2()
        })
        .sum()
}
