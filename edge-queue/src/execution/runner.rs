use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::{JobHandle, JobId, JobKind, JobRegistry, RegistryError, RegistryResult};

/// One provisioning workflow. Returns the final log line on success.
#[async_trait]
pub trait Task: Send + 'static {
    async fn run(self, job: JobHandle) -> anyhow::Result<String>;
}

/// Runs each submitted task on its own tokio task.
///
/// The task boundary is the only place outcomes are recorded: `Ok`
/// becomes `Success` at 100%, an error or panic becomes `Failed` with an
/// `Error: ...` log line. Nothing propagates past it.
#[derive(Clone)]
pub struct TaskRunner {
    registry: Arc<JobRegistry>,
    active: Arc<DashMap<JobId, CancellationToken>>,
}

impl TaskRunner {
    pub fn new(registry: Arc<JobRegistry>) -> Self {
        Self {
            registry,
            active: Arc::new(DashMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    pub fn active_jobs(&self) -> usize {
        self.active.len()
    }

    /// Register a job and start `task` in the background. Returns at once.
    pub fn submit<T: Task>(&self, kind: JobKind, task: T) -> JobId {
        let job_id = self.registry.create(kind);
        let cancel = CancellationToken::new();
        self.active.insert(job_id.clone(), cancel.clone());

        let handle = JobHandle::new(self.registry.clone(), job_id.clone(), cancel);
        let registry = self.registry.clone();
        let active = self.active.clone();
        let span = tracing::info_span!("job", job_id = %job_id, kind = %kind);
        let id = job_id.clone();

        tokio::spawn(
            async move {
                // inner spawn so a panic surfaces as a JoinError
                let outcome = tokio::spawn(task.run(handle)).await;
                let recorded = match outcome {
                    Ok(Ok(summary)) => registry.succeed(&id, summary),
                    Ok(Err(err)) => registry.fail(&id, format!("{err:#}")),
                    Err(join) if join.is_panic() => registry.fail(&id, "task panicked"),
                    Err(_) => registry.cancel(&id, "Task aborted"),
                };
                if let Err(RegistryError::JobAlreadyTerminal(_)) = recorded {
                    tracing::debug!("job already terminal, outcome dropped");
                }
                active.remove(&id);
            }
            .instrument(span),
        );

        job_id
    }

    /// Stop a running job: the record turns `Cancelled` immediately and
    /// the task's next wait or report observes the token.
    pub fn cancel(&self, job_id: &JobId) -> RegistryResult<()> {
        let record = self.registry.get(job_id)?;
        if record.is_terminal() {
            return Err(RegistryError::JobAlreadyTerminal(job_id.to_string()));
        }
        self.registry.cancel(job_id, "Cancelled by request")?;
        if let Some(token) = self.active.get(job_id) {
            token.cancel();
        }
        Ok(())
    }
}
