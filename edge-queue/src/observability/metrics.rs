use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Live job counters.
#[derive(Debug, Default)]
pub struct JobMetrics {
    jobs_created: AtomicU64,
    jobs_succeeded: AtomicU64,
    jobs_failed: AtomicU64,
    jobs_cancelled: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMetricsSnapshot {
    pub created: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub cancelled: u64,
    pub running: u64,
}

impl JobMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_created(&self) {
        self.jobs_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_succeeded(&self) {
        self.jobs_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed(&self) {
        self.jobs_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cancelled(&self) {
        self.jobs_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> JobMetricsSnapshot {
        let created = self.jobs_created.load(Ordering::Relaxed);
        let succeeded = self.jobs_succeeded.load(Ordering::Relaxed);
        let failed = self.jobs_failed.load(Ordering::Relaxed);
        let cancelled = self.jobs_cancelled.load(Ordering::Relaxed);
        JobMetricsSnapshot {
            created,
            succeeded,
            failed,
            cancelled,
            running: created.saturating_sub(succeeded + failed + cancelled),
        }
    }
}
