//! Pipeline configuration.
//!
//! Each component takes its own config struct; [`PipelineConfig`] aggregates
//! them for hierarchical loading (defaults, yaml, environment) via
//! `infrastructure::config::ConfigLoader`. Out-of-range values (thresholds
//! outside `[0, 1]`, zero caps) are a caller contract violation inside the
//! pipeline; the loader's `validate` rejects them at the boundary.

use serde::{Deserialize, Serialize};

use super::voting::TieBreaker;

/// Configuration for hindsight relabeling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelabelConfig {
    /// Minimum training accuracy for a failed attempt to be worth
    /// relabeling. Near-zero-signal attempts (e.g. 0.001) are rejected.
    pub min_accuracy: f64,
}

impl Default for RelabelConfig {
    fn default() -> Self {
        Self { min_accuracy: 0.01 }
    }
}

/// Configuration for synthetic validation heuristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Minimum character count for string outputs.
    pub min_output_chars: usize,

    /// Minimum alphanumeric token count for solution code.
    pub min_code_tokens: usize,

    /// Minimum Shannon char entropy (bits) of the canonical output key.
    pub min_output_entropy: f64,

    /// Canonical keys shorter than this skip the entropy check; repetition
    /// is only meaningful once there is something to repeat.
    pub entropy_min_key_len: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_output_chars: 3,
            min_code_tokens: 5,
            min_output_entropy: 0.5,
            entropy_min_key_len: 4,
        }
    }
}

/// Configuration for example selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Bound on top/bottom subset sizes.
    pub top_k: usize,

    /// Quality vs diversity balance for greedy-diverse selection.
    /// `0.0` = pure quality, `1.0` = pure diversity.
    pub diversity_weight: f64,

    /// Per-original-task quota for task-balanced selection.
    pub per_task_quota: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            diversity_weight: 0.5,
            per_task_quota: 2,
        }
    }
}

/// Configuration for ensemble voting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingConfig {
    /// Minimum ballots for a vote to be valid. The default of 1 makes an
    /// empty vote set invalid.
    pub min_votes: usize,

    /// How to resolve groups that tie on total weight.
    pub tie_breaker: TieBreaker,
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            min_votes: 1,
            tie_breaker: TieBreaker::Count,
        }
    }
}

/// Configuration for the TTT control loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TttConfig {
    /// Hard cap on iterations per session.
    pub max_iterations: u32,

    /// Best accuracy at which the session is satisfied and stops.
    pub satisfaction_threshold: f64,

    /// Accuracy gain below which a round does not count as improved for
    /// stagnation purposes. A sub-threshold gain still moves the session
    /// best.
    pub min_improvement_threshold: f64,

    /// How many consecutive non-improving iterations count as stagnation.
    /// Floored at 2.
    pub stagnation_window: usize,
}

impl Default for TttConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            satisfaction_threshold: 0.95,
            min_improvement_threshold: 0.01,
            stagnation_window: 2,
        }
    }
}

/// Logging configuration consumed by `infrastructure::logging`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, or error.
    pub level: String,

    /// Output format: json or pretty.
    pub format: String,

    /// Optional directory for rolling file output.
    pub log_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
            log_dir: None,
        }
    }
}

/// Aggregate configuration for the whole pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Hindsight relabeling thresholds.
    #[serde(default)]
    pub relabel: RelabelConfig,

    /// Degenerate-signal validation heuristics.
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Selection bounds and diversity balance.
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Ensemble voting behavior.
    #[serde(default)]
    pub voting: VotingConfig,

    /// TTT stop policy.
    #[serde(default)]
    pub ttt: TttConfig,

    /// Logging setup.
    #[serde(default)]
    pub logging: LoggingConfig,
}
