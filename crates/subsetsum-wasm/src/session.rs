//! Host-independent glue between the JS-facing exports and the engine.
//!
//! Everything here works on plain Rust values so it can be tested natively;
//! `lib.rs` only converts errors into `JsValue`s.

use serde::Serialize;
use subsetsum_core::{
    BatchController, BatchRecord, CancelToken, FindOneResult, Problem, SearchError, SessionState,
    Solver,
};

/// Validate host arguments; values first, then counts, then the target.
fn problem(numbers: &[f64], target: f64, min_count: u32, max_count: u32) -> Result<Problem, SearchError> {
    Ok(Problem::from_host(
        numbers,
        target,
        min_count as usize,
        max_count as usize,
    )?)
}

pub(crate) fn find_one(
    numbers: &[f64],
    target: f64,
    min_count: u32,
    max_count: u32,
    cancel: &CancelToken,
) -> Result<FindOneResult, SearchError> {
    let problem = problem(numbers, target, min_count, max_count)?;
    Ok(Solver::new().find_one_with(&problem, cancel))
}

pub(crate) fn init(
    controller: &mut BatchController,
    numbers: &[f64],
    target: f64,
    min_count: u32,
    max_count: u32,
    max_results: u32,
) -> Result<(), SearchError> {
    let problem = problem(numbers, target, min_count, max_count)?;
    controller.init_problem(problem, max_results as usize)
}

pub(crate) fn advance(controller: &mut BatchController, node_budget: u32) -> Result<BatchRecord, SearchError> {
    Ok(controller.advance(node_budget as u64)?)
}

/// Summary of a session for hosts that poll instead of keeping records.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub state: SessionState,
    pub total_found: usize,
    pub nodes_explored: u64,
}

impl SessionStatus {
    pub(crate) fn of(controller: &BatchController) -> Self {
        Self {
            state: controller.state(),
            total_found: controller.results().len(),
            nodes_explored: controller.nodes_explored(),
        }
    }
}

/// Records hold only strings, numbers, bools and sequences, so encoding
/// them cannot fail.
pub(crate) fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).expect("result records always serialize")
}
