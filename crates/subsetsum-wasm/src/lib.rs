//! WebAssembly bindings for the subset-sum engine
//!
//! Exposes the find-one call and the resumable find-all session to a
//! browser host. Records cross the boundary as JSON strings (or, via
//! `search_batch_object`, as plain JS objects).

use std::cell::RefCell;
use std::sync::{Mutex, PoisonError};
use subsetsum_core::{BatchController, CancelToken, SearchError};
use wasm_bindgen::prelude::*;

mod session;


pub use session::SessionStatus;

// One implicit session per thread backs the free-function API.
// WASM is single-threaded, so this is the host's only session.
thread_local! {
    static BATCH: RefCell<BatchController> = RefCell::new(BatchController::new());
}

// Token of the latest find_one call, raised by `cancel_search` from any thread
static FIND_ONE_CANCEL: Mutex<Option<CancelToken>> = Mutex::new(None);

fn set_find_one_cancel(token: CancelToken) {
    *FIND_ONE_CANCEL.lock().unwrap_or_else(PoisonError::into_inner) = Some(token);
}

// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_js(err: SearchError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Find ONE valid combination.
/// Returns JSON: { status: "found" | "not_found" | "cancelled", combination?: { indices, values, sum } }
#[wasm_bindgen]
pub fn find_one(numbers: &[f64], target: f64, min_count: u32, max_count: u32) -> Result<String, JsValue> {
    // Each call gets its own token; earlier cancels do not carry over
    let cancel = CancelToken::new();
    set_find_one_cancel(cancel.clone());
    session::find_one(numbers, target, min_count, max_count, &cancel)
        .map(|result| session::to_json(&result))
        .map_err(to_js)
}

/// Initialize a batch search for ALL combinations.
/// Call search_batch() repeatedly until it returns finished=true.
#[wasm_bindgen]
pub fn init_batch_search(
    numbers: &[f64],
    target: f64,
    min_count: u32,
    max_count: u32,
    max_results: u32,
) -> Result<(), JsValue> {
    BATCH.with(|cell| {
        // A destroyed session is terminal; a new search gets a fresh controller
        let mut controller = cell.borrow_mut();
        *controller = BatchController::new();
        session::init(&mut controller, numbers, target, min_count, max_count, max_results)
    })
    .map_err(to_js)
}

/// Run one batch of DFS work (node_budget nodes).
/// Returns JSON: { new_results: [...], total_found, nodes_explored, finished, progress }
#[wasm_bindgen]
pub fn search_batch(node_budget: u32) -> Result<String, JsValue> {
    BATCH
        .with(|cell| session::advance(&mut cell.borrow_mut(), node_budget))
        .map(|record| session::to_json(&record))
        .map_err(to_js)
}

/// Same as `search_batch`, returning a structured object instead of JSON text.
#[wasm_bindgen]
pub fn search_batch_object(node_budget: u32) -> Result<JsValue, JsValue> {
    let record = BATCH
        .with(|cell| session::advance(&mut cell.borrow_mut(), node_budget))
        .map_err(to_js)?;
    serde_wasm_bindgen::to_value(&record).map_err(JsValue::from)
}

/// Clean up batch search state to free memory.
#[wasm_bindgen]
pub fn destroy_batch_search() {
    BATCH.with(|cell| cell.borrow_mut().destroy());
}

/// Cancel the running searches: the current find_one returns "cancelled",
/// and the next search_batch call reports finished.
#[wasm_bindgen]
pub fn cancel_search() {
    if let Some(token) = FIND_ONE_CANCEL.lock().unwrap_or_else(PoisonError::into_inner).as_ref() {
        token.cancel();
    }
    BATCH.with(|cell| cell.borrow().cancel());
}

/// An explicit batch session, for hosts running more than one search.
#[wasm_bindgen]
pub struct BatchSearch {
    controller: BatchController,
}

#[wasm_bindgen]
impl BatchSearch {
    #[wasm_bindgen(constructor)]
    pub fn new(
        numbers: &[f64],
        target: f64,
        min_count: u32,
        max_count: u32,
        max_results: u32,
    ) -> Result<BatchSearch, JsValue> {
        let mut controller = BatchController::new();
        session::init(&mut controller, numbers, target, min_count, max_count, max_results)
            .map_err(to_js)?;
        Ok(BatchSearch { controller })
    }

    /// Run up to `node_budget` nodes; returns the batch record as JSON
    pub fn search_batch(&mut self, node_budget: u32) -> Result<String, JsValue> {
        session::advance(&mut self.controller, node_budget)
            .map(|record| session::to_json(&record))
            .map_err(to_js)
    }

    pub fn cancel(&self) {
        self.controller.cancel();
    }

    pub fn destroy(&mut self) {
        self.controller.destroy();
    }

    /// Current state and counters as JSON
    pub fn status(&self) -> String {
        session::to_json(&SessionStatus::of(&self.controller))
    }

    /// Every combination found so far, as a JSON array
    pub fn results(&self) -> String {
        session::to_json(&self.controller.results())
    }
}
