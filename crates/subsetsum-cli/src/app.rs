use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde::Serialize;
use std::time::{Duration, Instant};
use subsetsum_core::{
    BatchController, BatchRecord, CancelToken, Problem, SearchError, SessionState,
    SessionStateError, SolverConfig,
};
use tracing::debug;

/// Result of handling a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Continue,
    Cancel,
}

/// Final counters of a find-all run
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub state: SessionState,
    pub total_found: usize,
    pub nodes_explored: u64,
    /// Whether `max_results` stopped the search early
    pub capped: bool,
    pub elapsed_ms: u64,
}

/// A find-all run driven one batch at a time
pub struct App {
    controller: BatchController,
    node_budget: u64,
    max_results: usize,
    started: Instant,
}

impl App {
    pub fn new(problem: Problem, config: &SolverConfig) -> Result<Self, SearchError> {
        let mut controller = BatchController::new();
        controller.init_problem(problem, config.max_results)?;
        Ok(Self {
            controller,
            node_budget: config.node_budget.max(1),
            max_results: config.max_results,
            started: Instant::now(),
        })
    }

    /// Handle that cancels the search from another thread
    pub fn cancel_token(&self) -> CancelToken {
        self.controller.cancel_token()
    }

    /// Esc, q and Ctrl+C cancel the search
    pub fn handle_key(&self, key: KeyEvent) -> AppAction {
        if key.kind != KeyEventKind::Press {
            return AppAction::Continue;
        }
        let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
        if ctrl_c || matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
            debug!(key = ?key.code, "cancel requested from keyboard");
            self.controller.cancel();
            return AppAction::Cancel;
        }
        AppAction::Continue
    }

    /// Run one batch of `node_budget` nodes
    pub fn step(&mut self) -> Result<BatchRecord, SessionStateError> {
        self.controller.advance(self.node_budget)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn summary(&self) -> Summary {
        let total_found = self.controller.results().len();
        Summary {
            state: self.controller.state(),
            total_found,
            nodes_explored: self.controller.nodes_explored(),
            capped: total_found >= self.max_results,
            elapsed_ms: self.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use subsetsum_core::SearchParams;

    fn app(numbers: &[f64], target: i64, config: SolverConfig) -> App {
        let problem = Problem::new(numbers, SearchParams::any_size(target, numbers.len())).unwrap();
        App::new(problem, &config).unwrap()
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_runs_to_completion() {
        let config = SolverConfig {
            node_budget: 3,
            ..SolverConfig::default()
        };
        let mut app = app(&[1.0, 2.0, 3.0, 4.0, 5.0], 5, config);
        let mut batches = 0;
        while !app.step().unwrap().finished {
            batches += 1;
        }
        assert!(batches > 0);

        let summary = app.summary();
        assert_eq!(summary.state, SessionState::Finished);
        assert_eq!(summary.total_found, 3);
        assert!(!summary.capped);
    }

    #[test]
    fn test_cancel_keys() {
        let app = app(&[1.0, 2.0, 3.0], 3, SolverConfig::default());
        assert_eq!(app.handle_key(press(KeyCode::Char('x'), KeyModifiers::NONE)), AppAction::Continue);
        assert_eq!(app.handle_key(press(KeyCode::Char('c'), KeyModifiers::NONE)), AppAction::Continue);
        assert_eq!(app.handle_key(press(KeyCode::Esc, KeyModifiers::NONE)), AppAction::Cancel);
        assert_eq!(app.handle_key(press(KeyCode::Char('q'), KeyModifiers::NONE)), AppAction::Cancel);
        assert_eq!(app.handle_key(press(KeyCode::Char('c'), KeyModifiers::CONTROL)), AppAction::Cancel);
    }

    #[test]
    fn test_key_release_is_ignored() {
        let app = app(&[1.0, 2.0, 3.0], 3, SolverConfig::default());
        let release = KeyEvent {
            code: KeyCode::Esc,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(app.handle_key(release), AppAction::Continue);
    }

    #[test]
    fn test_escape_cancels_running_search() {
        let numbers: Vec<f64> = (1..=24).map(|v| v as f64).collect();
        let config = SolverConfig {
            node_budget: 50,
            max_results: 100_000,
            ..SolverConfig::default()
        };
        let mut app = app(&numbers, 40, config);
        assert!(!app.step().unwrap().finished);

        app.handle_key(press(KeyCode::Esc, KeyModifiers::NONE));
        let record = app.step().unwrap();
        assert!(record.finished);
        assert!(record.new_results.is_empty());
        assert_eq!(app.summary().state, SessionState::Cancelled);
    }

    #[test]
    fn test_cancel_token_from_timer_thread() {
        let numbers: Vec<f64> = (1..=24).map(|v| v as f64).collect();
        let config = SolverConfig {
            node_budget: 50,
            max_results: 100_000,
            ..SolverConfig::default()
        };
        let mut app = app(&numbers, 40, config);
        app.step().unwrap();

        let token = app.cancel_token();
        std::thread::spawn(move || token.cancel()).join().unwrap();
        assert!(app.step().unwrap().finished);
        assert_eq!(app.summary().state, SessionState::Cancelled);
    }

    #[test]
    fn test_capped_summary() {
        let numbers: Vec<f64> = (1..=20).map(|v| v as f64).collect();
        let config = SolverConfig {
            max_results: 2,
            ..SolverConfig::default()
        };
        let mut app = app(&numbers, 21, config);
        while !app.step().unwrap().finished {}

        let summary = app.summary();
        assert_eq!(summary.total_found, 2);
        assert!(summary.capped);
        assert_eq!(summary.state, SessionState::Finished);
    }
}
