//! Service layer: the five pipeline components.
//!
//! Every component is a pure, synchronous transformation over in-memory
//! collections -- no shared mutable state, fully reentrant. The only
//! suspension point in the crate is `TttController::run_session`, which
//! awaits the external execution engine between iterations.

pub mod relabeler;
pub mod selector;
pub mod ttt_controller;
pub mod validator;
pub mod voter;

pub use relabeler::HindsightRelabeler;
pub use selector::{DiversityMetric, ExampleSelector, TaskCodeDiversity};
pub use ttt_controller::{optional_outputs_equal, outputs_equal, IterationOutcome, TttController};
pub use validator::SyntheticValidator;
pub use voter::{calculate_vote_weight, ensemble_vote, normalize_output_key, EnsembleVoter};
