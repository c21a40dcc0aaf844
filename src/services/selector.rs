//! Selection of validated synthetics.
//!
//! Ranks validated solutions by quality and/or diversity and produces
//! bounded top/bottom subsets. All selection passes are pure: they allocate
//! fresh result vectors, never mutate their input, and are recomputed per
//! call.
//!
//! The exact notion of "different enough" for greedy-diverse selection is a
//! pluggable strategy ([`DiversityMetric`]); the default blends task
//! identity with code shape, because those are the two signals a synthetic
//! already carries without any embedding machinery.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::domain::models::config::SelectionConfig;
use crate::domain::models::{SelectedExample, SelectionResult, SyntheticTaskSolution};

/// Pairwise dissimilarity between two synthetics, in `[0, 1]`.
/// `0.0` = indistinguishable, `1.0` = maximally different.
pub trait DiversityMetric: Send + Sync {
    /// Distance between two candidates.
    fn distance(&self, a: &SyntheticTaskSolution, b: &SyntheticTaskSolution) -> f64;
}

/// Default diversity metric: mean of task-identity distance (0/1 on
/// `original_task_id`) and Jaccard distance over code token sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskCodeDiversity;

impl DiversityMetric for TaskCodeDiversity {
    fn distance(&self, a: &SyntheticTaskSolution, b: &SyntheticTaskSolution) -> f64 {
        let task_distance = if a.task.original_task_id == b.task.original_task_id {
            0.0
        } else {
            1.0
        };
        let code_distance = jaccard_distance(&token_set(&a.solution), &token_set(&b.solution));
        (task_distance + code_distance) / 2.0
    }
}

/// Ranks validated synthetics into bounded subsets.
#[derive(Clone)]
pub struct ExampleSelector {
    config: SelectionConfig,
    diversity: Arc<dyn DiversityMetric>,
}

impl ExampleSelector {
    /// Create a selector with the default diversity metric.
    pub fn new(config: SelectionConfig) -> Self {
        Self {
            config,
            diversity: Arc::new(TaskCodeDiversity),
        }
    }

    /// Swap in a different diversity strategy.
    pub fn with_diversity_metric(mut self, metric: Arc<dyn DiversityMetric>) -> Self {
        self.diversity = metric;
        self
    }

    /// Best `top_k` by quality score, descending. Ties keep input order.
    pub fn select_top(&self, valid: &[SyntheticTaskSolution]) -> SelectionResult {
        let mut ordered: Vec<&SyntheticTaskSolution> = valid.iter().collect();
        // Stable sort: equal scores preserve original batch order.
        ordered.sort_by(|a, b| {
            b.quality_score
                .partial_cmp(&a.quality_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        SelectionResult {
            top_examples: rank(ordered.into_iter().take(self.config.top_k)),
            bottom_examples: Vec::new(),
            total_candidates: valid.len(),
        }
    }

    /// Worst `top_k` by quality score, ascending. The mirror of
    /// [`select_top`](Self::select_top); rank 1 is the worst example.
    pub fn select_bottom(&self, valid: &[SyntheticTaskSolution]) -> SelectionResult {
        let mut ordered: Vec<&SyntheticTaskSolution> = valid.iter().collect();
        ordered.sort_by(|a, b| {
            a.quality_score
                .partial_cmp(&b.quality_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        SelectionResult {
            top_examples: Vec::new(),
            bottom_examples: rank(ordered.into_iter().take(self.config.top_k)),
            total_candidates: valid.len(),
        }
    }

    /// Greedy maximal-coverage selection balancing quality against pairwise
    /// dissimilarity to the already-selected set.
    ///
    /// Seeds with the highest-quality candidate, then repeatedly adds the
    /// candidate maximizing
    /// `(1 - w) * quality + w * min_distance_to_selected`, so the result is
    /// not `top_k` near-duplicates of the single best item.
    pub fn select_greedy_diverse(&self, valid: &[SyntheticTaskSolution]) -> SelectionResult {
        let w = self.config.diversity_weight;
        let mut remaining: Vec<usize> = (0..valid.len()).collect();
        let mut picked: Vec<(usize, f64)> = Vec::new();

        while picked.len() < self.config.top_k && !remaining.is_empty() {
            let mut best_pos = 0;
            let mut best_score = f64::NEG_INFINITY;
            for (pos, &idx) in remaining.iter().enumerate() {
                let candidate = &valid[idx];
                let score = if picked.is_empty() {
                    candidate.quality_score
                } else {
                    let min_distance = picked
                        .iter()
                        .map(|&(sel, _)| self.diversity.distance(candidate, &valid[sel]))
                        .fold(f64::INFINITY, f64::min);
                    (1.0 - w) * candidate.quality_score + w * min_distance
                };
                if score > best_score {
                    best_score = score;
                    best_pos = pos;
                }
            }
            let idx = remaining.remove(best_pos);
            picked.push((idx, best_score));
        }

        let top_examples = picked
            .into_iter()
            .enumerate()
            .map(|(i, (idx, score))| SelectedExample {
                solution: valid[idx].clone(),
                rank: i + 1,
                selection_score: score,
            })
            .collect();

        SelectionResult {
            top_examples,
            bottom_examples: Vec::new(),
            total_candidates: valid.len(),
        }
    }

    /// Selection with per-original-task quotas so no single task dominates.
    ///
    /// Within each task, candidates are ordered by quality descending; tasks
    /// are visited round-robin in first-seen order until `top_k` examples
    /// are chosen or every task's quota is spent.
    pub fn select_with_task_balance(&self, valid: &[SyntheticTaskSolution]) -> SelectionResult {
        let groups = group_by_task(valid);
        let mut task_order: Vec<&str> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for solution in valid {
            if seen.insert(solution.task.original_task_id.as_str()) {
                task_order.push(solution.task.original_task_id.as_str());
            }
        }

        // Quality-descending queue per task, capped at the quota.
        let mut queues: HashMap<&str, Vec<&SyntheticTaskSolution>> = HashMap::new();
        for task_id in &task_order {
            let mut members: Vec<&SyntheticTaskSolution> = groups[*task_id].clone();
            members.sort_by(|a, b| {
                b.quality_score
                    .partial_cmp(&a.quality_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            members.truncate(self.config.per_task_quota);
            members.reverse(); // pop() yields best-first
            queues.insert(task_id, members);
        }

        let mut chosen: Vec<&SyntheticTaskSolution> = Vec::new();
        while chosen.len() < self.config.top_k {
            let mut progressed = false;
            for task_id in &task_order {
                if chosen.len() >= self.config.top_k {
                    break;
                }
                if let Some(next) = queues.get_mut(task_id).and_then(Vec::pop) {
                    chosen.push(next);
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }

        SelectionResult {
            top_examples: rank(chosen.into_iter()),
            bottom_examples: Vec::new(),
            total_candidates: valid.len(),
        }
    }
}

/// Group synthetics by their original task, preserving order within groups.
pub fn group_by_task(
    valid: &[SyntheticTaskSolution],
) -> HashMap<&str, Vec<&SyntheticTaskSolution>> {
    let mut groups: HashMap<&str, Vec<&SyntheticTaskSolution>> = HashMap::new();
    for solution in valid {
        groups
            .entry(solution.task.original_task_id.as_str())
            .or_default()
            .push(solution);
    }
    groups
}

/// Tag an ordered iterator of solutions with 1-based ranks; the quality
/// score doubles as the selection score for plain quality orderings.
fn rank<'a>(ordered: impl Iterator<Item = &'a SyntheticTaskSolution>) -> Vec<SelectedExample> {
    ordered
        .enumerate()
        .map(|(i, solution)| SelectedExample {
            solution: solution.clone(),
            rank: i + 1,
            selection_score: solution.quality_score,
        })
        .collect()
}

/// Alphanumeric token set of a code string.
fn token_set(code: &str) -> HashSet<&str> {
    code.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| !t.is_empty())
        .collect()
}

/// Jaccard distance between two token sets. Two empty sets are identical.
#[allow(clippy::cast_precision_loss)]
fn jaccard_distance(a: &HashSet<&str>, b: &HashSet<&str>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    1.0 - intersection as f64 / union as f64
}
