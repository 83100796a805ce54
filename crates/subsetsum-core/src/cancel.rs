//! Cooperative cancellation shared by every search engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Search nodes entered between cancellation checks in a single-pass DFS.
pub const DFS_POLL_INTERVAL: u64 = 4_096;

/// Half-subset masks visited between cancellation checks in meet-in-the-middle.
pub const MITM_POLL_INTERVAL: usize = 65_536;

/// Cooperative cancellation flag, cheap to clone and share across threads.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// A search stopped because its [`CancelToken`] was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;
