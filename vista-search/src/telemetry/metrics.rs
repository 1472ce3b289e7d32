//! Pipeline counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by every pipeline run.
///
/// Shared between concurrently running requests; all updates are relaxed
/// atomic increments.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    /// Requests taken from the source
    pub received: AtomicU64,

    /// Requests dropped by validation
    pub rejected: AtomicU64,

    /// Responses published
    pub emitted: AtomicU64,

    /// Requests that failed after validation
    pub failed: AtomicU64,

    /// Hits returned by the index, before filtering
    pub hits_found: AtomicU64,

    /// Hits that survived filtering
    pub hits_returned: AtomicU64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// Get current snapshot of all metrics.
    pub fn snapshot(&self) -> PipelineMetricsSnapshot {
        PipelineMetricsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            emitted: self.emitted.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            hits_found: self.hits_found.load(Ordering::Relaxed),
            hits_returned: self.hits_returned.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of pipeline metrics at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineMetricsSnapshot {
    pub received: u64,
    pub rejected: u64,
    pub emitted: u64,
    pub failed: u64,
    pub hits_found: u64,
    pub hits_returned: u64,
}

impl PipelineMetricsSnapshot {
    /// Requests that reached a terminal state.
    pub fn completed(&self) -> u64 {
        self.rejected + self.emitted + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let metrics = PipelineMetrics::new();
        PipelineMetrics::incr(&metrics.received);
        PipelineMetrics::incr(&metrics.received);
        PipelineMetrics::incr(&metrics.emitted);
        PipelineMetrics::incr(&metrics.rejected);
        PipelineMetrics::add(&metrics.hits_found, 5);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.received, 2);
        assert_eq!(snapshot.hits_found, 5);
        assert_eq!(snapshot.completed(), 2);
    }
}
