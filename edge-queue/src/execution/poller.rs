use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;

use crate::{JobHandle, JobUpdate, PollError};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(20);
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(3600);

/// Anything that can report the state of a long-running operation by name.
#[async_trait]
pub trait OperationSource: Send + Sync {
    async fn operation(&self, name: &str) -> anyhow::Result<OperationStatus>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationStatus {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<Value>,
}

impl OperationStatus {
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn succeeded() -> Self {
        Self {
            done: true,
            ..Self::default()
        }
    }

    pub fn failed(error: Value) -> Self {
        Self {
            done: true,
            error: Some(error),
            ..Self::default()
        }
    }
}

/// Capped linear map from elapsed time to a synthetic progress value:
/// `min(cap, base + elapsed / horizon * range)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressCurve {
    pub base: u8,
    pub range: u8,
    pub cap: u8,
    pub horizon: Duration,
}

impl ProgressCurve {
    pub const fn new(base: u8, range: u8, cap: u8) -> Self {
        Self {
            base,
            range,
            cap,
            horizon: Duration::from_secs(300),
        }
    }

    pub fn at(&self, elapsed: Duration) -> u8 {
        let horizon = self.horizon.as_secs().max(1);
        let gained = elapsed.as_secs().saturating_mul(self.range as u64) / horizon;
        let value = (self.base as u64).saturating_add(gained);
        value.min(self.cap as u64).min(100) as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` waits indefinitely.
    pub max_wait: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_wait: Some(DEFAULT_MAX_WAIT),
        }
    }
}

/// Waits for a long-running operation to finish.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationPoller {
    policy: PollPolicy,
}

impl OperationPoller {
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Poll `name` until done. Each pending poll writes
    /// `"{label} ({elapsed}s)"` and the curve's progress to the job.
    #[tracing::instrument(skip(self, source, curve, job), fields(job_id = %job.id()))]
    pub async fn wait<S>(
        &self,
        source: &S,
        name: &str,
        curve: ProgressCurve,
        label: &str,
        job: &JobHandle,
    ) -> Result<(), PollError>
    where
        S: OperationSource + ?Sized,
    {
        let started = Instant::now();
        let cancel = job.cancellation();

        loop {
            let status = tokio::select! {
                _ = cancel.cancelled() => return Err(PollError::Cancelled),
                status = source.operation(name) => status.map_err(PollError::Source)?,
            };

            if status.done {
                return match status.error {
                    Some(error) => {
                        tracing::warn!(operation = name, %error, "operation failed");
                        Err(PollError::Failed(error))
                    }
                    None => {
                        tracing::debug!(operation = name, "operation done");
                        Ok(())
                    }
                };
            }

            let elapsed = started.elapsed();
            job.report(
                JobUpdate::new()
                    .progress(curve.at(elapsed))
                    .status(format!("{label} ({}s)", elapsed.as_secs())),
            )?;

            if let Some(max_wait) = self.policy.max_wait {
                if elapsed >= max_wait {
                    return Err(PollError::TimedOut(max_wait));
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(PollError::Cancelled),
                _ = tokio::time::sleep(self.policy.interval) => {}
            }
        }
    }
}
