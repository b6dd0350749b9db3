use async_trait::async_trait;
use edge_queue::{JobHandle, Task};
use edge_synth::{strip_server_fields, ServiceConfig};
use serde::Deserialize;
use serde_json::Value;

use super::staging::staging_service_id;
use super::{await_operation, decode, string_or_number, PROMOTE_CURVE};
use crate::cloud::{operation_name, SERVICE_UPDATE_MASK};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PromotePayload {
    pub service_id: String,
    /// Stored snapshot to promote; the live staging service when absent.
    #[serde(default, deserialize_with = "string_or_number")]
    pub generation: Option<String>,
}

pub struct PromoteTask {
    state: AppState,
    payload: Value,
}

impl PromoteTask {
    pub fn new(state: AppState, payload: Value) -> Self {
        Self { state, payload }
    }
}

#[async_trait]
impl Task for PromoteTask {
    async fn run(self, job: JobHandle) -> anyhow::Result<String> {
        let payload: PromotePayload = decode(self.payload)?;
        let cloud = &self.state.cloud;
        let service_id = payload.service_id.as_str();

        cloud.authenticate().await?;

        let mut document: ServiceConfig = match &payload.generation {
            Some(generation) => {
                job.log(format!("Promoting version {generation} to production..."))?;
                let bucket = self.state.system_bucket().await?;
                self.state
                    .versions
                    .get_version(&bucket, service_id, generation)
                    .await?
            }
            None => {
                job.log("Promoting current staging config to production...")?;
                let live = cloud.get_service(&staging_service_id(service_id)).await?;
                ServiceConfig::from_value(live)?
            }
        };
        strip_server_fields(&mut document);

        job.log(format!("Updating production service {service_id}..."))?;
        let body = document.to_value()?;
        let response = cloud
            .patch_service(service_id, &body, SERVICE_UPDATE_MASK)
            .await?;
        let op = operation_name(&response)?;

        await_operation(
            &self.state,
            &job,
            &op,
            PROMOTE_CURVE,
            "Promoting",
            "Promotion failed:",
        )
        .await?;

        Ok("Production environment updated successfully!".to_string())
    }
}
