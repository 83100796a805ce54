//! Resumable find-all search.
//!
//! [`BatchController`] wraps the DFS engine in an explicit lifecycle so a
//! caller can advance an exhaustive search a bounded number of nodes at a
//! time, report progress in between, and cancel it cooperatively. The
//! controller is a plain value owned by its caller; independent searches
//! are just independent controllers.

use crate::cancel::CancelToken;
use crate::dfs::{SearchStack, Step};
use crate::error::{SearchError, SessionStateError, ValidationError};
use crate::input::{Problem, SearchParams};
use crate::report::{BatchRecord, Combination};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Progress reported while a search is still running stays below this.
const PROGRESS_CEILING: f64 = 0.999_999;

/// Lifecycle of a batch search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    Ready,
    Running,
    Finished,
    Cancelled,
    Destroyed,
}

/// Search state owned by one initialized session.
#[derive(Debug)]
struct BatchSession {
    problem: Problem,
    stack: SearchStack,
    max_results: usize,
    nodes_explored: u64,
    reported: Vec<Combination>,
    /// High-water mark so progress never moves backwards
    progress: f64,
}

impl BatchSession {
    fn new(problem: Problem, max_results: usize) -> Self {
        let stack = SearchStack::new(&problem);
        Self {
            problem,
            stack,
            max_results,
            nodes_explored: 0,
            reported: Vec::new(),
            progress: 0.0,
        }
    }

    fn run(&mut self, node_budget: u64) -> BatchRecord {
        let mut new_results = Vec::new();
        let mut remaining = node_budget;

        while remaining > 0 && self.reported.len() < self.max_results {
            match self.stack.step(&self.problem) {
                Step::Visited => {}
                Step::Found(combination) => {
                    self.reported.push(combination.clone());
                    new_results.push(combination);
                }
                Step::Exhausted => break,
            }
            remaining -= 1;
            self.nodes_explored += 1;
        }
        self.stack.settle();

        let finished = self.stack.is_exhausted() || self.reported.len() >= self.max_results;
        self.progress = if finished {
            1.0
        } else {
            self.progress
                .max(self.stack.resolved_fraction().min(PROGRESS_CEILING))
        };

        BatchRecord {
            new_results,
            total_found: self.reported.len(),
            nodes_explored: self.nodes_explored,
            finished,
            progress: self.progress,
        }
    }
}

/// Pausable, cancellable find-all search over one input.
#[derive(Debug)]
pub struct BatchController {
    state: SessionState,
    session: Option<BatchSession>,
    cancel: CancelToken,
}

impl Default for BatchController {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchController {
    pub fn new() -> Self {
        Self {
            state: SessionState::Uninitialized,
            session: None,
            cancel: CancelToken::new(),
        }
    }

    /// Validate the input and start a fresh search rooted at position 0.
    ///
    /// Any previous session is released first. On failure the controller is
    /// left `Uninitialized` with nothing allocated.
    pub fn init(
        &mut self,
        numbers: &[f64],
        params: SearchParams,
        max_results: usize,
    ) -> Result<(), SearchError> {
        self.release()?;
        let problem = Problem::new(numbers, params)?;
        self.start(problem, max_results)
    }

    /// Like [`init`](Self::init) for an already validated problem.
    pub fn init_problem(&mut self, problem: Problem, max_results: usize) -> Result<(), SearchError> {
        self.release()?;
        self.start(problem, max_results)
    }

    fn release(&mut self) -> Result<(), SessionStateError> {
        if self.state == SessionState::Destroyed {
            return Err(SessionStateError::AlreadyDestroyed);
        }
        self.session = None;
        self.state = SessionState::Uninitialized;
        Ok(())
    }

    fn start(&mut self, problem: Problem, max_results: usize) -> Result<(), SearchError> {
        if max_results == 0 {
            return Err(ValidationError::InvalidMaxResults.into());
        }
        debug!(
            n = problem.len(),
            target = problem.target(),
            max_results,
            infeasible = problem.is_infeasible(),
            "batch search initialized"
        );
        self.cancel.reset();
        self.session = Some(BatchSession::new(problem, max_results));
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Resume the search for at most `node_budget` nodes.
    ///
    /// Stops early when the tree is exhausted or `max_results` is reached.
    /// Cancellation is only observed here, at the start of the call: that
    /// call reports `finished` with no new results.
    pub fn advance(&mut self, node_budget: u64) -> Result<BatchRecord, SessionStateError> {
        match self.state {
            SessionState::Ready | SessionState::Running => {}
            SessionState::Uninitialized => return Err(SessionStateError::NotInitialized),
            SessionState::Destroyed => return Err(SessionStateError::AlreadyDestroyed),
            SessionState::Finished | SessionState::Cancelled => {
                return Err(SessionStateError::AlreadyFinished)
            }
        }
        let session = self
            .session
            .as_mut()
            .expect("active batch state always owns a session");

        if self.cancel.is_cancelled() {
            self.state = SessionState::Cancelled;
            debug!(
                nodes = session.nodes_explored,
                found = session.reported.len(),
                "batch search cancelled"
            );
            return Ok(BatchRecord {
                new_results: Vec::new(),
                total_found: session.reported.len(),
                nodes_explored: session.nodes_explored,
                finished: true,
                progress: session.progress,
            });
        }

        self.state = SessionState::Running;
        let record = session.run(node_budget);
        trace!(
            budget = node_budget,
            new = record.new_results.len(),
            nodes = record.nodes_explored,
            progress = record.progress,
            "batch advanced"
        );
        if record.finished {
            self.state = SessionState::Finished;
            debug!(
                nodes = record.nodes_explored,
                found = record.total_found,
                "batch search finished"
            );
        }
        Ok(record)
    }

    /// Ask the active search to stop at its next `advance`.
    pub fn cancel(&self) {
        if matches!(self.state, SessionState::Ready | SessionState::Running) {
            self.cancel.cancel();
        }
    }

    /// A handle that can raise the cancel flag from elsewhere.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Release all search state. Repeated calls, and calls before any
    /// successful `init`, are no-ops.
    pub fn destroy(&mut self) {
        match self.state {
            SessionState::Uninitialized | SessionState::Destroyed => {}
            _ => {
                debug!("batch search destroyed");
                self.session = None;
                self.state = SessionState::Destroyed;
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Every combination reported so far, in discovery order.
    pub fn results(&self) -> &[Combination] {
        self.session
            .as_ref()
            .map_or(&[], |session| session.reported.as_slice())
    }

    pub fn nodes_explored(&self) -> u64 {
        self.session.as_ref().map_or(0, |session| session.nodes_explored)
    }
}
