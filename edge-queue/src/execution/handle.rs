use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{JobId, JobRegistry, JobUpdate, RegistryResult};

/// The owning task's write access to its job record.
///
/// Writes fail once the record is terminal (for example after an
/// external cancel), which lets a task stop at its next report.
#[derive(Clone)]
pub struct JobHandle {
    registry: Arc<JobRegistry>,
    job_id: JobId,
    cancel: CancellationToken,
}

impl JobHandle {
    pub fn new(registry: Arc<JobRegistry>, job_id: JobId, cancel: CancellationToken) -> Self {
        Self {
            registry,
            job_id,
            cancel,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.job_id
    }

    pub fn log(&self, line: impl Into<String>) -> RegistryResult<()> {
        self.registry.update(&self.job_id, JobUpdate::new().log(line))
    }

    pub fn progress(&self, progress: u8) -> RegistryResult<()> {
        self.registry
            .update(&self.job_id, JobUpdate::new().progress(progress))
    }

    pub fn report(&self, update: JobUpdate) -> RegistryResult<()> {
        self.registry.update(&self.job_id, update)
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
