use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use edge_queue::{JobHandle, Task};
use edge_synth::{strip_server_fields, ServiceConfig};
use serde::Deserialize;
use serde_json::Value;

use super::{await_operation, decode, STAGING_CURVE};
use crate::cloud::{operation_name, SERVICE_UPDATE_MASK};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StagingPayload {
    pub service_id: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

pub fn staging_service_id(service_id: &str) -> String {
    format!("{service_id}-staging")
}

/// Production document re-labelled for its staging copy.
pub fn staging_document(
    mut production: ServiceConfig,
    service_id: &str,
    description: Option<&str>,
) -> ServiceConfig {
    strip_server_fields(&mut production);
    production.description = Some(
        description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Staging for {service_id}")),
    );
    production
}

pub struct StagingTask {
    state: AppState,
    payload: Value,
}

impl StagingTask {
    pub fn new(state: AppState, payload: Value) -> Self {
        Self { state, payload }
    }

    /// Upload every `*.yaml` from the sample directory. Failures are
    /// logged and counted; they never fail the job.
    async fn sync_samples(&self, bucket: &str) {
        let dir = &self.state.settings.sample_config_dir;
        let files = match yaml_files(dir).await {
            Ok(files) => files,
            Err(err) => {
                tracing::debug!(dir = %dir.display(), error = %err, "no sample configs to sync");
                return;
            }
        };

        for (name, path) in files {
            let upload = async {
                let text = tokio::fs::read_to_string(&path).await?;
                self.state.versions.put_text(bucket, &name, text).await?;
                anyhow::Ok(())
            };
            if let Err(err) = upload.await {
                self.state.counters.sample_sync_failed();
                tracing::warn!(file = %name, error = %err, "sample config sync failed");
            }
        }
    }
}

async fn yaml_files(dir: &Path) -> std::io::Result<Vec<(String, std::path::PathBuf)>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".yaml") {
            files.push((name, entry.path()));
        }
    }
    files.sort();
    Ok(files)
}

#[async_trait]
impl Task for StagingTask {
    async fn run(self, job: JobHandle) -> anyhow::Result<String> {
        let payload: StagingPayload = decode(self.payload.clone())?;
        let cloud = &self.state.cloud;
        let service_id = payload.service_id.as_str();
        let staging_id = staging_service_id(service_id);
        let region = payload
            .region
            .clone()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| self.state.settings.default_region.clone());

        job.log(format!("Starting cloning process for {service_id}..."))?;
        cloud.authenticate().await?;
        let bucket = self.state.system_bucket().await?;

        job.log(format!("Ensuring GCS bucket {bucket} exists in {region}..."))?;
        self.state
            .versions
            .ensure_bucket(&bucket, &region)
            .await
            .with_context(|| format!("preparing bucket {bucket}"))?;

        job.log("Fetching original service configuration...")?;
        let production = ServiceConfig::from_value(cloud.get_service(service_id).await?)?;

        job.log(format!("Preparing staging config: {staging_id}..."))?;
        let document = staging_document(production, service_id, payload.description.as_deref());
        let body = document.to_value()?;

        job.log("Deploying staging service...")?;
        let response = match cloud.get_service(&staging_id).await {
            Ok(_) => {
                job.log("Staging service already exists. Updating...")?;
                cloud
                    .patch_service(&staging_id, &body, SERVICE_UPDATE_MASK)
                    .await?
            }
            Err(err) if err.is_not_found() => cloud.create_service(&staging_id, &body).await?,
            Err(err) => return Err(err.into()),
        };
        let op = operation_name(&response)?;
        job.log(format!("Operation started: {op}"))?;

        await_operation(
            &self.state,
            &job,
            &op,
            STAGING_CURVE,
            "Deploying Staging",
            "Deployment failed:",
        )
        .await?;

        job.log("Syncing configuration to GCS with versioning...")?;
        self.state
            .versions
            .put_version(&bucket, service_id, &document)
            .await?;
        self.sync_samples(&bucket).await;

        Ok("Staging environment created and synced successfully!".to_string())
    }
}
