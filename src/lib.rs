//! Soar - Self-Improvement Pipeline for Coding Agents
//!
//! Soar is the gradient-free learning core of an autonomous coding agent. It
//! turns *failed* task attempts into new, solvable training signal (hindsight
//! relabeling), filters out degenerate signal (validation), selects a diverse
//! high-quality subset (selection), and aggregates repeated attempts into a
//! single trusted answer (accuracy-weighted ensemble voting). A test-time
//! training (TTT) controller drives repeated rounds of the pipeline and
//! decides when to stop.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure data model, ports, and domain errors
//! - **Service Layer** (`services`): The five pipeline components
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//!
//! # Example
//!
//! ```
//! use soar::domain::models::{AttemptRecord, CanonicalValue};
//! use soar::services::{EnsembleVoter, HindsightRelabeler, SyntheticValidator};
//! use soar::domain::models::config::PipelineConfig;
//!
//! let config = PipelineConfig::default();
//! let relabeler = HindsightRelabeler::new(config.relabel);
//! let validator = SyntheticValidator::new(config.validation);
//!
//! // A failed attempt still demonstrates *some* task correctly.
//! let attempt = AttemptRecord::new(
//!     "task-a",
//!     "Triple the input",
//!     false,
//!     0.4,
//!     "fn solve(input: i64) -> i64 { input * 3 }",
//!     CanonicalValue::from(15i64),
//! );
//! let synthetics = relabeler.relabel_batch(vec![attempt]);
//! let batch = validator.validate_batch(synthetics);
//! assert_eq!(batch.valid.len() + batch.invalid.len(), 1);
//! ```

pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    AttemptRecord, CandidateOutput, CanonicalValue, SelectedExample, SelectionResult,
    SkillContext, StopReason,
    SyntheticTask, SyntheticTaskSolution, TieBreaker, TttIterationResult, TttSessionResult,
    TttState, ValidationBatch, ValidationCheck, ValidationResult, Vote, VoteGroup, VotingResult,
};
pub use domain::ports::AttemptSource;
pub use services::{
    ensemble_vote, normalize_output_key, outputs_equal, EnsembleVoter, ExampleSelector,
    HindsightRelabeler, SyntheticValidator, TttController,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
