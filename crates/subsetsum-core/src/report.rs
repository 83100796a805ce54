//! Externally observable result records.
//!
//! These serialize (via serde) to the exact JSON shapes the host bindings
//! exchange; the engine itself only deals in the typed values.

use crate::input::Entry;
use serde::{Deserialize, Serialize};

/// A witness subset: original row indices, their values, and the verified sum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Combination {
    pub indices: Vec<usize>,
    pub values: Vec<u64>,
    pub sum: u64,
}

impl Combination {
    /// Build a combination ordered by original index, recomputing the sum.
    pub fn from_entries(mut entries: Vec<Entry>) -> Self {
        entries.sort_unstable_by_key(|e| e.index);
        let indices = entries.iter().map(|e| e.index).collect();
        let values: Vec<u64> = entries.iter().map(|e| e.value).collect();
        let sum = values.iter().sum();
        Combination { indices, values, sum }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Abort if the recomputed sum drifted from what the search accepted.
    pub(crate) fn verified(self, target: u64) -> Self {
        assert_eq!(
            self.sum, target,
            "accepted combination {:?} does not sum to target",
            self.indices
        );
        self
    }
}

/// Outcome tag of a find-one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Found,
    NotFound,
    /// The search was stopped through its cancel token before it decided
    Cancelled,
}

/// Result of a find-one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindOneResult {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combination: Option<Combination>,
}

impl FindOneResult {
    pub fn found(combination: Combination) -> Self {
        Self {
            status: Status::Found,
            combination: Some(combination),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            combination: None,
        }
    }

    pub fn cancelled() -> Self {
        Self {
            status: Status::Cancelled,
            combination: None,
        }
    }

    pub fn is_found(&self) -> bool {
        self.status == Status::Found
    }
}

/// What one `advance` call on a batch session produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    /// Combinations accepted during this call only
    pub new_results: Vec<Combination>,
    /// Cumulative results for the session
    pub total_found: usize,
    /// Cumulative decision-tree nodes visited
    pub nodes_explored: u64,
    /// True once exhausted, capped or cancelled
    pub finished: bool,
    /// Non-decreasing estimate; 1.0 only when the search completed
    pub progress: f64,
}
