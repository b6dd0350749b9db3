use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use edge_blob::VersionStore;
use edge_queue::{JobRegistry, OperationPoller, TaskRunner};
use serde::Serialize;
use serde_json::Value;

use crate::cloud::CloudApi;
use crate::config::DeployerSettings;

/// Suffix of the per-project bucket holding staging snapshots.
pub const SYSTEM_BUCKET_SUFFIX: &str = "mediacdn-do-not-delete";

/// Counts for the "log and keep going" paths.
#[derive(Debug, Default)]
pub struct PolicyCounters {
    identity_bootstrap_failures: AtomicU64,
    sample_sync_failures: AtomicU64,
    version_list_failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PolicyCountersSnapshot {
    pub identity_bootstrap_failures: u64,
    pub sample_sync_failures: u64,
    pub version_list_failures: u64,
}

impl PolicyCounters {
    pub fn identity_bootstrap_failed(&self) {
        self.identity_bootstrap_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sample_sync_failed(&self) {
        self.sample_sync_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn version_list_failed(&self) {
        self.version_list_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PolicyCountersSnapshot {
        PolicyCountersSnapshot {
            identity_bootstrap_failures: self.identity_bootstrap_failures.load(Ordering::Relaxed),
            sample_sync_failures: self.sample_sync_failures.load(Ordering::Relaxed),
            version_list_failures: self.version_list_failures.load(Ordering::Relaxed),
        }
    }
}

/// Shared handles for route handlers and background tasks.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<DeployerSettings>,
    pub cloud: Arc<dyn CloudApi>,
    pub versions: Arc<VersionStore>,
    pub runner: TaskRunner,
    pub poller: OperationPoller,
    pub counters: Arc<PolicyCounters>,
}

impl AppState {
    pub fn new(
        settings: DeployerSettings,
        cloud: Arc<dyn CloudApi>,
        versions: Arc<VersionStore>,
    ) -> Self {
        let poller = OperationPoller::new(settings.poll_policy());
        Self {
            settings: Arc::new(settings),
            cloud,
            versions,
            runner: TaskRunner::new(Arc::new(JobRegistry::new())),
            poller,
            counters: Arc::new(PolicyCounters::default()),
        }
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        self.runner.registry()
    }

    /// Bucket for staging snapshots: `bucket_name` from the settings file
    /// when present, otherwise derived from the project number.
    pub async fn system_bucket(&self) -> Result<String> {
        if let Some(bucket) = bucket_override(&self.settings.settings_path).await? {
            return Ok(bucket);
        }
        let number = self.cloud.project_number().await?;
        Ok(format!("{number}-{SYSTEM_BUCKET_SUFFIX}"))
    }
}

async fn bucket_override(path: &Path) -> Result<Option<String>> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("reading {}", path.display()));
        }
    };
    let settings: Value =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    Ok(settings
        .get("bucket_name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string))
}
