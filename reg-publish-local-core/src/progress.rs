//! Progress reporters. Presentation only: the transfer engine calls them, nothing reads them back.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, info};

use crate::contract::Progress;

/// Reports progress as structured log events.
#[derive(Debug, Default)]
pub struct TracingProgress {
    total: AtomicUsize,
    done: AtomicUsize,
}

impl TracingProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Progress for TracingProgress {
    fn start(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        self.done.store(0, Ordering::Relaxed);
        info!(total, "Transfer started");
    }

    fn increment(&self, n: usize) {
        let done = self.done.fetch_add(n, Ordering::Relaxed) + n;
        debug!(done, total = self.total.load(Ordering::Relaxed), "Transfer progress");
    }

    fn stop(&self) {
        info!(
            done = self.done.load(Ordering::Relaxed),
            total = self.total.load(Ordering::Relaxed),
            "Transfer finished"
        );
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn start(&self, _total: usize) {}
    fn increment(&self, _n: usize) {}
    fn stop(&self) {}
}
