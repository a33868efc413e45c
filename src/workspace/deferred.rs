use std::collections::VecDeque;
use std::fmt;

use super::BufferChange;

/// Outcome of draining the deferred queue.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    pub applied: usize,
    pub failed: usize,
}

/// FIFO of buffer events that arrived before the workspace root was known.
#[derive(Debug, Default)]
pub struct DeferredChangeQueue {
    queue: VecDeque<BufferChange>,
}

impl DeferredChangeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, change: BufferChange) {
        tracing::debug!(uri = change.uri(), "workspace root unknown; deferring buffer event");
        self.queue.push_back(change);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Apply `process` to every queued change in arrival order, leaving the
    /// queue empty. A failing change is logged and the rest still drain.
    pub fn drain_into<F, E>(&mut self, mut process: F) -> DrainReport
    where
        F: FnMut(BufferChange) -> Result<(), E>,
        E: fmt::Display,
    {
        let mut report = DrainReport::default();
        for change in std::mem::take(&mut self.queue) {
            let uri = change.uri().to_string();
            match process(change) {
                Ok(()) => report.applied += 1,
                Err(e) => {
                    tracing::warn!(uri = %uri, "deferred buffer event failed: {e}");
                    report.failed += 1;
                }
            }
        }
        report
    }
}
