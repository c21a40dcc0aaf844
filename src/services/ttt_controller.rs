//! Test-time training control loop.
//!
//! Drives repeated rounds of the SOAR pipeline over one task: each round
//! consumes a batch of attempts from the external engine, feeds them through
//! relabel -> validate -> select to accumulate synthetic training signal,
//! runs an ensemble vote to pick a current-best answer, and updates the
//! session's convergence state. The controller stops on satisfaction,
//! stagnation, or the iteration cap.
//!
//! [`TttState`] is treated as an immutable value: [`TttController::process_iteration`]
//! takes the old state and returns a new one. Callers must serialize
//! `process_iteration` calls per state; independent sessions are free to run
//! concurrently.

use chrono::Utc;

use crate::domain::errors::DomainResult;
use crate::domain::models::config::{PipelineConfig, TttConfig};
use crate::domain::models::{
    AttemptRecord, CandidateOutput, CanonicalValue, SelectionResult, SkillContext, StopReason,
    TttIterationResult, TttSessionResult, TttState, VotingResult,
};
use crate::domain::ports::AttemptSource;
use crate::services::relabeler::HindsightRelabeler;
use crate::services::selector::ExampleSelector;
use crate::services::validator::SyntheticValidator;
use crate::services::voter::{create_votes, EnsembleVoter};

/// Everything one round produced: the successor state, the round's voting
/// outcome, and the selected synthetic training signal for the caller.
#[derive(Debug, Clone)]
pub struct IterationOutcome {
    /// Successor session state. The input state is unchanged.
    pub state: TttState,

    /// This round's ensemble vote over the attempts' outputs.
    pub voting: VotingResult,

    /// Greedy-diverse selection over this round's validated synthetics.
    pub selection: SelectionResult,
}

/// Drives the relabel -> validate -> select -> vote pipeline per round and
/// decides when a session is done.
#[derive(Clone)]
pub struct TttController {
    relabeler: HindsightRelabeler,
    validator: SyntheticValidator,
    selector: ExampleSelector,
    voter: EnsembleVoter,
    config: TttConfig,
}

impl TttController {
    /// Build a controller from an aggregate pipeline configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            relabeler: HindsightRelabeler::new(config.relabel),
            validator: SyntheticValidator::new(config.validation),
            selector: ExampleSelector::new(config.selection),
            voter: EnsembleVoter::new(config.voting),
            config: config.ttt,
        }
    }

    /// Build a controller from already-configured components.
    pub fn from_parts(
        relabeler: HindsightRelabeler,
        validator: SyntheticValidator,
        selector: ExampleSelector,
        voter: EnsembleVoter,
        config: TttConfig,
    ) -> Self {
        Self {
            relabeler,
            validator,
            selector,
            voter,
            config,
        }
    }

    /// Run one round over the given attempts and return the successor state.
    ///
    /// Appends one [`TttIterationResult`] to the history. `best_accuracy`
    /// and `best_solution` move on any strict gain, but the iteration only
    /// counts as `improved` when the gain clears `min_improvement_threshold`;
    /// sub-threshold gains feed the stagnation stop. Total: an empty or
    /// all-degenerate round still yields a well-formed outcome (empty
    /// selection, invalid vote).
    pub fn process_iteration(
        &self,
        state: &TttState,
        attempts: Vec<AttemptRecord>,
    ) -> IterationOutcome {
        let attempt_count = attempts.len();

        // Round statistics and the voting pool come from the raw attempts,
        // before relabeling consumes them.
        let mut round_best_accuracy = 0.0f64;
        let mut round_best_solution = String::new();
        let mut accuracy_sum = 0.0f64;
        let mut candidates: Vec<CandidateOutput> = Vec::with_capacity(attempt_count);
        for attempt in &attempts {
            accuracy_sum += attempt.training_accuracy;
            if attempt.training_accuracy > round_best_accuracy {
                round_best_accuracy = attempt.training_accuracy;
                round_best_solution.clone_from(&attempt.code);
            }
            candidates.push(CandidateOutput {
                output: attempt.actual_output.clone(),
                program: attempt.code.clone(),
                training_accuracy: attempt.training_accuracy,
            });
        }
        #[allow(clippy::cast_precision_loss)]
        let average_accuracy = if attempt_count == 0 {
            0.0
        } else {
            accuracy_sum / attempt_count as f64
        };

        let synthetics = self.relabeler.relabel_batch(attempts);
        let batch = self.validator.validate_batch(synthetics);
        let selection = self.selector.select_greedy_diverse(&batch.valid);
        let voting = self.voter.vote(&create_votes(&candidates));

        // A better solution is never discarded, but gains below the margin
        // still count as stagnation.
        let gained = round_best_accuracy > state.best_accuracy;
        let improved = gained
            && round_best_accuracy - state.best_accuracy >= self.config.min_improvement_threshold;
        let (best_accuracy, best_solution) = if gained {
            (round_best_accuracy, round_best_solution)
        } else {
            (state.best_accuracy, state.best_solution.clone())
        };

        let iteration = state.current_iteration + 1;
        let mut history = state.iteration_history.clone();
        history.push(TttIterationResult {
            iteration,
            best_accuracy,
            average_accuracy,
            attempt_count,
            synthetic_count: batch.valid.len(),
            best_solution: best_solution.clone(),
            improved,
            completed_at: Utc::now(),
        });

        tracing::info!(
            iteration,
            attempt_count,
            synthetic_count = batch.valid.len(),
            round_best_accuracy,
            improved,
            vote_valid = voting.is_valid,
            "ttt iteration complete"
        );

        IterationOutcome {
            state: TttState {
                current_iteration: iteration,
                best_accuracy,
                best_solution,
                iteration_history: history,
            },
            voting,
            selection,
        }
    }

    /// Whether the session should run another iteration.
    ///
    /// False when the iteration cap is reached, the best accuracy meets the
    /// satisfaction threshold, or the most recent consecutive iterations
    /// (at least two) all failed to improve.
    pub fn should_continue(&self, state: &TttState) -> bool {
        self.stop_reason(state).is_none()
    }

    /// Why the session should stop, or `None` to keep iterating.
    pub fn stop_reason(&self, state: &TttState) -> Option<StopReason> {
        if state.best_accuracy >= self.config.satisfaction_threshold {
            return Some(StopReason::Satisfied);
        }
        if state.current_iteration >= self.config.max_iterations {
            return Some(StopReason::MaxIterations);
        }
        let window = self.config.stagnation_window.max(2);
        let recent = state.recent_window(window);
        if !recent.is_empty() && recent.iter().all(|r| !r.improved) {
            return Some(StopReason::Stagnated);
        }
        None
    }

    /// Assemble the final session result from the last voting pass.
    pub fn create_session_result(
        &self,
        task_id: &str,
        state: &TttState,
        final_voting: &VotingResult,
        skill_context: Option<SkillContext>,
    ) -> TttSessionResult {
        TttSessionResult {
            task_id: task_id.to_string(),
            final_prediction: final_voting.winner.clone(),
            iterations_completed: state.current_iteration,
            best_accuracy: state.best_accuracy,
            stop_reason: self.stop_reason(state),
            skill_context,
        }
    }

    /// Drive a full session against an external attempt source.
    ///
    /// This is the only suspension point in the crate: the loop awaits the
    /// source at the iteration boundary and nowhere else, so a caller may
    /// cancel between iterations without corrupting state.
    pub async fn run_session(
        &self,
        task_id: &str,
        source: &dyn AttemptSource,
    ) -> DomainResult<TttSessionResult> {
        let mut state = TttState::new();
        let mut last_voting = VotingResult::invalid(0);

        while self.should_continue(&state) {
            let attempts = source.next_batch(task_id, state.current_iteration).await?;
            let outcome = self.process_iteration(&state, attempts);
            state = outcome.state;
            last_voting = outcome.voting;
        }

        let skill_context = source.skill_context(task_id).await?;
        let result = self.create_session_result(task_id, &state, &last_voting, skill_context);
        tracing::info!(
            task_id,
            iterations = result.iterations_completed,
            best_accuracy = result.best_accuracy,
            stop_reason = ?result.stop_reason,
            prediction_valid = last_voting.is_valid,
            "ttt session finished"
        );
        Ok(result)
    }
}

impl Default for TttController {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

/// Output equality under canonical form: object key order irrelevant, array
/// order significant.
pub fn outputs_equal(a: &CanonicalValue, b: &CanonicalValue) -> bool {
    a.canonical_key() == b.canonical_key()
}

/// Output equality lifted over optional values. An absent output never
/// equals `Null`: a program that produced nothing and a program that
/// produced `null` did not agree.
pub fn optional_outputs_equal(a: Option<&CanonicalValue>, b: Option<&CanonicalValue>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => outputs_equal(a, b),
        (None, None) => true,
        _ => false,
    }
}
