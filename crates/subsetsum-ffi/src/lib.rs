use std::sync::{Arc, Mutex};
use subsetsum_core::{
    BatchController, BatchRecord, CancelToken, Combination, FindOneResult, Problem, SearchError,
    SessionState, Solver, Status, ValidationError,
};

uniffi::setup_scaffolding!();

/// Errors surfaced to the mobile host
#[derive(Debug, Clone, thiserror::Error, uniffi::Error)]
pub enum SubsetSumError {
    /// Input rejected before any search started
    #[error("{message}")]
    InvalidInput { message: String, row: Option<u64> },
    /// Batch operation called out of sequence
    #[error("{message}")]
    InvalidState { message: String },
}

impl From<ValidationError> for SubsetSumError {
    fn from(err: ValidationError) -> Self {
        SubsetSumError::InvalidInput {
            message: err.to_string(),
            row: err.row().map(|row| row as u64),
        }
    }
}

impl From<SearchError> for SubsetSumError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Validation(err) => err.into(),
            SearchError::Session(err) => SubsetSumError::InvalidState {
                message: err.to_string(),
            },
        }
    }
}

/// A combination found by the search
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct ComboRecord {
    /// Original row indices, ascending
    pub indices: Vec<u64>,
    /// Values at those rows
    pub values: Vec<u64>,
    /// Verified sum (always the target)
    pub sum: u64,
}

impl From<Combination> for ComboRecord {
    fn from(combo: Combination) -> Self {
        ComboRecord {
            indices: combo.indices.into_iter().map(|i| i as u64).collect(),
            values: combo.values,
            sum: combo.sum,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, uniffi::Enum)]
pub enum SearchStatus {
    Found,
    NotFound,
    Cancelled,
}

/// Result of a find-one request
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FindOneReport {
    pub status: SearchStatus,
    pub combination: Option<ComboRecord>,
}

impl From<FindOneResult> for FindOneReport {
    fn from(result: FindOneResult) -> Self {
        FindOneReport {
            status: match result.status {
                Status::Found => SearchStatus::Found,
                Status::NotFound => SearchStatus::NotFound,
                Status::Cancelled => SearchStatus::Cancelled,
            },
            combination: result.combination.map(Into::into),
        }
    }
}

/// One batch of find-all work
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct BatchReport {
    /// Combinations found during this batch
    pub new_results: Vec<ComboRecord>,
    pub total_found: u64,
    pub nodes_explored: u64,
    pub finished: bool,
    /// 0.0 .. 1.0, never decreasing
    pub progress: f64,
}

impl From<BatchRecord> for BatchReport {
    fn from(record: BatchRecord) -> Self {
        BatchReport {
            new_results: record.new_results.into_iter().map(Into::into).collect(),
            total_found: record.total_found as u64,
            nodes_explored: record.nodes_explored,
            finished: record.finished,
            progress: record.progress,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, uniffi::Enum)]
pub enum BatchState {
    Uninitialized,
    Ready,
    Running,
    Finished,
    Cancelled,
    Destroyed,
}

impl From<SessionState> for BatchState {
    fn from(state: SessionState) -> Self {
        match state {
            SessionState::Uninitialized => BatchState::Uninitialized,
            SessionState::Ready => BatchState::Ready,
            SessionState::Running => BatchState::Running,
            SessionState::Finished => BatchState::Finished,
            SessionState::Cancelled => BatchState::Cancelled,
            SessionState::Destroyed => BatchState::Destroyed,
        }
    }
}

fn problem(
    numbers: &[f64],
    target: f64,
    min_count: u32,
    max_count: u32,
) -> Result<Problem, ValidationError> {
    Problem::from_host(numbers, target, min_count as usize, max_count as usize)
}

/// Find one subset of `numbers` summing to `target` with a size in
/// `min_count..=max_count`.
#[uniffi::export]
pub fn find_one(
    numbers: Vec<f64>,
    target: f64,
    min_count: u32,
    max_count: u32,
) -> Result<FindOneReport, SubsetSumError> {
    let problem = problem(&numbers, target, min_count, max_count)?;
    Ok(Solver::new().find_one_in(&problem).into())
}

/// A find-one request that another thread can cancel.
///
/// `run` blocks until a witness is found, the input is exhausted, or
/// `cancel` is called, in which case it reports `Cancelled`.
#[derive(uniffi::Object)]
pub struct FindOneSearch {
    problem: Problem,
    cancel: CancelToken,
}

#[uniffi::export]
impl FindOneSearch {
    #[uniffi::constructor]
    pub fn new(
        numbers: Vec<f64>,
        target: f64,
        min_count: u32,
        max_count: u32,
    ) -> Result<Arc<Self>, SubsetSumError> {
        let problem = problem(&numbers, target, min_count, max_count)?;
        Ok(Arc::new(Self {
            problem,
            cancel: CancelToken::new(),
        }))
    }

    pub fn run(&self) -> FindOneReport {
        Solver::new().find_one_with(&self.problem, &self.cancel).into()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// A resumable find-all search.
///
/// `search_batch` may run on a worker thread while `cancel` is called from
/// the UI thread; cancelling never waits for the running batch.
#[derive(uniffi::Object)]
pub struct BatchSearch {
    controller: Mutex<BatchController>,
    cancel: CancelToken,
}

#[uniffi::export]
impl BatchSearch {
    /// Validate the input and prepare a search rooted at the first value
    #[uniffi::constructor]
    pub fn new(
        numbers: Vec<f64>,
        target: f64,
        min_count: u32,
        max_count: u32,
        max_results: u32,
    ) -> Result<Arc<Self>, SubsetSumError> {
        let problem = problem(&numbers, target, min_count, max_count)?;
        let mut controller = BatchController::new();
        controller.init_problem(problem, max_results as usize)?;
        let cancel = controller.cancel_token();
        Ok(Arc::new(Self {
            controller: Mutex::new(controller),
            cancel,
        }))
    }

    /// Run up to `node_budget` search nodes
    pub fn search_batch(&self, node_budget: u32) -> Result<BatchReport, SubsetSumError> {
        let mut controller = self.controller.lock().unwrap();
        let record = controller.advance(node_budget as u64).map_err(SearchError::from)?;
        Ok(record.into())
    }

    /// Request cancellation; observed by the next `search_batch`
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Free the search state; later batches fail with `InvalidState`
    pub fn destroy(&self) {
        self.controller.lock().unwrap().destroy();
    }

    pub fn state(&self) -> BatchState {
        self.controller.lock().unwrap().state().into()
    }

    /// Every combination found so far
    pub fn results(&self) -> Vec<ComboRecord> {
        let controller = self.controller.lock().unwrap();
        controller.results().iter().cloned().map(Into::into).collect()
    }

    /// Every combination found so far, as a JSON array for export
    pub fn results_json(&self) -> String {
        let controller = self.controller.lock().unwrap();
        // Combinations are plain numbers and sequences
        serde_json::to_string(controller.results()).expect("combinations always serialize")
    }
}
