use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::types::{STATUS_CANCELLED, STATUS_FAILED, STATUS_SUCCESS};
use crate::{
    JobEvent, JobId, JobKind, JobMetrics, JobRecord, JobState, RegistryError, RegistryResult,
};

const EVENT_CAPACITY: usize = 256;

/// Partial update merged into a job record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobUpdate {
    pub status: Option<String>,
    pub progress: Option<u8>,
    pub log: Option<String>,
}

impl JobUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn log(mut self, line: impl Into<String>) -> Self {
        self.log = Some(line.into());
        self
    }
}

/// Process-wide job store.
///
/// Records are sharded across a `DashMap`, so inserts for different jobs
/// and reads of any job never wait on an unrelated writer. Records are
/// kept for the lifetime of the process.
pub struct JobRegistry {
    jobs: DashMap<JobId, JobRecord>,
    sequence: AtomicU64,
    events: broadcast::Sender<JobEvent>,
    metrics: Arc<JobMetrics>,
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl JobRegistry {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            jobs: DashMap::new(),
            sequence: AtomicU64::new(1),
            events,
            metrics: Arc::new(JobMetrics::new()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.events.subscribe()
    }

    pub fn metrics(&self) -> &JobMetrics {
        &self.metrics
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    fn emit(&self, event: JobEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    /// Register a new job in `Starting` state.
    pub fn create(&self, kind: JobKind) -> JobId {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let job_id = JobId::generate(kind, Utc::now().timestamp(), sequence);
        let record = JobRecord::new(job_id.clone(), kind);
        let at = record.created_at;

        self.jobs.insert(job_id.clone(), record);
        self.metrics.increment_created();
        info!(job_id = %job_id, kind = %kind, "job.created");
        self.emit(JobEvent::Created {
            job_id: job_id.clone(),
            kind,
            at,
        });
        job_id
    }

    pub fn get(&self, job_id: &JobId) -> RegistryResult<JobRecord> {
        self.jobs
            .get(job_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RegistryError::JobNotFound(job_id.to_string()))
    }

    /// Merge `update` into a running job. Progress never moves backwards.
    pub fn update(&self, job_id: &JobId, update: JobUpdate) -> RegistryResult<()> {
        let mut entry = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| RegistryError::JobNotFound(job_id.to_string()))?;
        let record = entry.value_mut();
        if record.is_terminal() {
            return Err(RegistryError::JobAlreadyTerminal(job_id.to_string()));
        }

        record.state = JobState::Running;
        if let Some(progress) = update.progress {
            record.progress = record.progress.max(progress.min(100));
        }
        let status_changed = update.status.is_some() || update.progress.is_some();
        if let Some(status) = update.status {
            record.status = status;
        }
        if let Some(line) = update.log {
            record.logs.push(line);
        }
        record.updated_at = Utc::now();

        let event = status_changed.then(|| JobEvent::Progress {
            job_id: job_id.clone(),
            progress: record.progress,
            status: record.status.clone(),
            at: record.updated_at,
        });
        drop(entry);

        if let Some(event) = event {
            self.emit(event);
        }
        Ok(())
    }

    pub fn succeed(&self, job_id: &JobId, message: impl Into<String>) -> RegistryResult<()> {
        self.finish(job_id, JobState::Succeeded, STATUS_SUCCESS, message.into())?;
        self.metrics.increment_succeeded();
        info!(job_id = %job_id, "job.succeeded");
        self.emit(JobEvent::Succeeded {
            job_id: job_id.clone(),
            at: Utc::now(),
        });
        Ok(())
    }

    /// `message` is recorded as `Error: {message}`.
    pub fn fail(&self, job_id: &JobId, message: impl Into<String>) -> RegistryResult<()> {
        let message = message.into();
        self.finish(
            job_id,
            JobState::Failed,
            STATUS_FAILED,
            format!("Error: {message}"),
        )?;
        self.metrics.increment_failed();
        warn!(job_id = %job_id, error = %message, "job.failed");
        self.emit(JobEvent::Failed {
            job_id: job_id.clone(),
            error: message,
            at: Utc::now(),
        });
        Ok(())
    }

    pub fn cancel(&self, job_id: &JobId, message: impl Into<String>) -> RegistryResult<()> {
        self.finish(job_id, JobState::Cancelled, STATUS_CANCELLED, message.into())?;
        self.metrics.increment_cancelled();
        info!(job_id = %job_id, "job.cancelled");
        self.emit(JobEvent::Cancelled {
            job_id: job_id.clone(),
            at: Utc::now(),
        });
        Ok(())
    }

    fn finish(
        &self,
        job_id: &JobId,
        state: JobState,
        status: &str,
        log: String,
    ) -> RegistryResult<()> {
        let mut entry = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| RegistryError::JobNotFound(job_id.to_string()))?;
        let record = entry.value_mut();
        if record.is_terminal() {
            return Err(RegistryError::JobAlreadyTerminal(job_id.to_string()));
        }

        record.state = state;
        record.status = status.to_string();
        if state == JobState::Succeeded {
            record.progress = 100;
        }
        record.logs.push(log);
        record.updated_at = Utc::now();
        Ok(())
    }
}
