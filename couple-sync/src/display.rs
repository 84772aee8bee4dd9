//! Signal to the widget layer that local state changed.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Payload-less notification emitted after a local commit or a merged pull.
pub trait DisplayRefresh: Send + Sync {
    fn refresh(&self);
}

/// Ignores refresh signals.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRefresh;

impl DisplayRefresh for NoopRefresh {
    fn refresh(&self) {}
}

/// Counts refresh signals.
#[derive(Debug, Default)]
pub struct CountingRefresh {
    count: AtomicUsize,
}

impl CountingRefresh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of signals received so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl DisplayRefresh for CountingRefresh {
    fn refresh(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}
