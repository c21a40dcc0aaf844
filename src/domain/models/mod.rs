//! Soar domain models.

pub mod attempt;
pub mod config;
pub mod selection;
pub mod synthetic;
pub mod ttt;
pub mod value;
pub mod voting;

pub use attempt::{AttemptRecord, SkillContext};
pub use config::{
    LoggingConfig, PipelineConfig, RelabelConfig, SelectionConfig, TttConfig, ValidationConfig,
    VotingConfig,
};
pub use selection::{SelectedExample, SelectionResult};
pub use synthetic::{
    SyntheticTask, SyntheticTaskSolution, ValidationBatch, ValidationCheck, ValidationResult,
};
pub use ttt::{StopReason, TttIterationResult, TttSessionResult, TttState};
pub use value::CanonicalValue;
pub use voting::{CandidateOutput, TieBreaker, Vote, VoteGroup, VotingResult};
