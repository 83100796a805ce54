//! Strategy selection and the one-call entry points.

use crate::batch::BatchController;
use crate::cancel::{CancelToken, Interrupted};
use crate::dfs;
use crate::error::{SearchError, ValidationError};
use crate::input::{Problem, SearchParams};
use crate::mitm::{self, MAX_MITM_SIZE};
use crate::report::{Combination, FindOneResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which request is being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    FindOne,
    FindAll,
}

/// Engine a request is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    MeetInTheMiddle,
    BranchAndBound,
    /// Resumable branch-and-bound driven by a [`BatchController`]
    Batched,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::MeetInTheMiddle => write!(f, "meet-in-the-middle"),
            Strategy::BranchAndBound => write!(f, "branch-and-bound"),
            Strategy::Batched => write!(f, "batched branch-and-bound"),
        }
    }
}

/// Tuning knobs for a [`Solver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Largest input routed to meet-in-the-middle (capped at 40)
    pub mitm_threshold: usize,
    /// Nodes per batch when [`Solver::find_all`] drives a session itself
    pub node_budget: u64,
    /// Default cap on enumerated combinations
    pub max_results: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            mitm_threshold: MAX_MITM_SIZE,
            node_budget: 10_000,
            max_results: 1_000,
        }
    }
}

impl SolverConfig {
    /// Never use meet-in-the-middle; useful for cross-checking the engines.
    pub fn dfs_only() -> Self {
        Self {
            mitm_threshold: 0,
            ..Self::default()
        }
    }

    /// Small batches for hosts that want frequent progress updates.
    pub fn interactive() -> Self {
        Self {
            node_budget: 2_000,
            ..Self::default()
        }
    }
}

/// Stateless entry point; per-request state lives on the stack or in a
/// [`BatchController`].
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Route a request of `mode` over `n` validated entries.
    pub fn strategy(&self, mode: Mode, n: usize) -> Strategy {
        let threshold = self.config.mitm_threshold.min(MAX_MITM_SIZE);
        match mode {
            Mode::FindOne if n <= threshold => Strategy::MeetInTheMiddle,
            Mode::FindOne => Strategy::BranchAndBound,
            Mode::FindAll => Strategy::Batched,
        }
    }

    /// Find one qualifying subset of `numbers`.
    pub fn find_one(
        &self,
        numbers: &[f64],
        params: SearchParams,
    ) -> Result<FindOneResult, ValidationError> {
        let problem = Problem::new(numbers, params)?;
        Ok(self.find_one_in(&problem))
    }

    /// Find one qualifying subset of an already validated problem.
    pub fn find_one_in(&self, problem: &Problem) -> FindOneResult {
        self.find_one_with(problem, &CancelToken::new())
    }

    /// Like [`find_one_in`](Self::find_one_in), giving up with
    /// [`Status::Cancelled`](crate::Status::Cancelled) once `cancel` is raised.
    pub fn find_one_with(&self, problem: &Problem, cancel: &CancelToken) -> FindOneResult {
        if problem.is_infeasible() {
            debug!(n = problem.len(), target = problem.target(), "find_one short-circuited");
            return FindOneResult::not_found();
        }

        let strategy = self.strategy(Mode::FindOne, problem.len());
        let outcome = match strategy {
            Strategy::MeetInTheMiddle => mitm::find_first_with(problem, cancel),
            Strategy::BranchAndBound => dfs::find_first_with(problem, cancel).map(|outcome| {
                debug!(nodes = outcome.nodes_explored, "branch-and-bound pass done");
                outcome.combination
            }),
            Strategy::Batched => unreachable!("find_one is never batched"),
        };
        debug!(
            n = problem.len(),
            %strategy,
            found = matches!(outcome, Ok(Some(_))),
            cancelled = outcome.is_err(),
            "find_one"
        );

        match outcome {
            Ok(Some(combination)) => FindOneResult::found(combination),
            Ok(None) => FindOneResult::not_found(),
            Err(Interrupted) => FindOneResult::cancelled(),
        }
    }

    /// Enumerate up to `max_results` subsets, driving a batch session to completion.
    pub fn find_all(
        &self,
        numbers: &[f64],
        params: SearchParams,
        max_results: usize,
    ) -> Result<Vec<Combination>, SearchError> {
        let strategy = self.strategy(Mode::FindAll, numbers.len());
        debug!(n = numbers.len(), %strategy, max_results, "find_all");
        match strategy {
            Strategy::Batched => {
                let mut controller = BatchController::new();
                controller.init(numbers, params, max_results)?;
                let budget = self.config.node_budget.max(1);
                while !controller.advance(budget)?.finished {}
                Ok(controller.results().to_vec())
            }
            Strategy::MeetInTheMiddle | Strategy::BranchAndBound => {
                unreachable!("{} cannot enumerate", strategy)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Status;

    fn params(target: i64, min: usize, max: usize) -> SearchParams {
        SearchParams::new(target, min, max)
    }

    #[test]
    fn test_strategy_routing() {
        let solver = Solver::new();
        assert_eq!(solver.strategy(Mode::FindOne, 1), Strategy::MeetInTheMiddle);
        assert_eq!(solver.strategy(Mode::FindOne, 40), Strategy::MeetInTheMiddle);
        assert_eq!(solver.strategy(Mode::FindOne, 41), Strategy::BranchAndBound);
        assert_eq!(solver.strategy(Mode::FindAll, 5), Strategy::Batched);
        assert_eq!(solver.strategy(Mode::FindAll, 5_000), Strategy::Batched);
    }

    #[test]
    fn test_threshold_is_capped() {
        let solver = Solver::with_config(SolverConfig {
            mitm_threshold: 64,
            ..SolverConfig::default()
        });
        assert_eq!(solver.strategy(Mode::FindOne, 41), Strategy::BranchAndBound);
        let dfs = Solver::with_config(SolverConfig::dfs_only());
        assert_eq!(dfs.strategy(Mode::FindOne, 3), Strategy::BranchAndBound);
    }

    #[test]
    fn test_find_one_small() {
        let result = Solver::new()
            .find_one(&[1.0, 2.0, 3.0, 4.0, 5.0], params(5, 1, 5))
            .unwrap();
        assert_eq!(result.status, Status::Found);
        let combo = result.combination.unwrap();
        assert_eq!(combo.sum, 5);
        assert!(!combo.is_empty() && combo.len() <= 5);
    }

    #[test]
    fn test_find_one_short_circuit() {
        let result = Solver::new()
            .find_one(&[10.0, 20.0, 30.0], params(100, 1, 3))
            .unwrap();
        assert_eq!(result, FindOneResult::not_found());
    }

    #[test]
    fn test_find_one_large_uses_dfs() {
        let numbers: Vec<f64> = (1..=60).map(|v| v as f64 * 7.0).collect();
        let result = Solver::new().find_one(&numbers, params(7 * 100, 3, 6)).unwrap();
        let combo = result.combination.unwrap();
        assert_eq!(combo.sum, 700);
        assert!(combo.len() >= 3 && combo.len() <= 6);
        for (&index, &value) in combo.indices.iter().zip(&combo.values) {
            assert_eq!(value as f64, numbers[index]);
        }
    }

    #[test]
    fn test_find_one_validation_error() {
        let err = Solver::new()
            .find_one(&[1.0, 2.5], params(3, 1, 2))
            .unwrap_err();
        assert_eq!(err, ValidationError::NonIntegerValue(1));
    }

    #[test]
    fn test_original_indices_preserved() {
        let numbers = [5.0, 3.0, 7.0, 2.0];
        let result = Solver::new().find_one(&numbers, params(10, 2, 4)).unwrap();
        let combo = result.combination.unwrap();
        assert_eq!(combo.sum, 10);
        for (&index, &value) in combo.indices.iter().zip(&combo.values) {
            assert_eq!(numbers[index], value as f64);
        }
    }

    #[test]
    fn test_find_all() {
        let all = Solver::new()
            .find_all(&[1.0, 1.0, 1.0, 1.0], params(2, 2, 2), 10)
            .unwrap();
        assert_eq!(all.len(), 6);
    }

    #[test]
    fn test_find_all_rejects_bad_input() {
        let err = Solver::new().find_all(&[], params(2, 0, 0), 10).unwrap_err();
        assert_eq!(err, SearchError::Validation(ValidationError::EmptyInput));
    }

    #[test]
    fn test_find_one_cancelled_beyond_mitm_threshold() {
        // 300 even values and an odd target: no witness, and no bound sees it
        let numbers: Vec<f64> = (1..=300).map(|v| v as f64 * 2.0).collect();
        let problem = Problem::new(&numbers, params(40_001, 1, 300)).unwrap();
        let solver = Solver::new();
        assert_eq!(solver.strategy(Mode::FindOne, problem.len()), Strategy::BranchAndBound);

        let cancel = CancelToken::new();
        let timer = cancel.clone();
        std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            timer.cancel();
        });
        let result = solver.find_one_with(&problem, &cancel);
        assert_eq!(result, FindOneResult::cancelled());
        assert!(!result.is_found());
    }

    #[test]
    fn test_find_one_cancelled_with_mitm() {
        let problem = Problem::new(&[1.0, 2.0, 3.0], params(3, 1, 3)).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        assert_eq!(Solver::new().find_one_with(&problem, &cancel).status, Status::Cancelled);
    }

    #[test]
    fn test_infeasible_wins_over_cancel() {
        let problem = Problem::new(&[10.0, 20.0], params(100, 1, 2)).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        assert_eq!(Solver::new().find_one_with(&problem, &cancel), FindOneResult::not_found());
    }

    #[test]
    fn test_find_all_ignores_mitm_threshold() {
        let numbers: Vec<f64> = (1..=12).map(|v| v as f64).collect();
        let a = Solver::new().find_all(&numbers, params(15, 1, 12), 1_000).unwrap();
        let b = Solver::with_config(SolverConfig::dfs_only())
            .find_all(&numbers, params(15, 1, 12), 1_000)
            .unwrap();
        assert_eq!(a, b);
        assert!(a.iter().all(|c| c.sum == 15));
    }
}
