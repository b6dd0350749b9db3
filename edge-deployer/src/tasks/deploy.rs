use anyhow::{anyhow, Context};
use async_trait::async_trait;
use edge_queue::{JobHandle, Task};
use edge_synth::{
    build_service, clone_service, DeliveryProfile, DualTokenConfig, ServiceConfig, SetupType,
    TokenChain,
};
use serde::Deserialize;
use serde_json::Value;

use super::{await_operation, decode, DEPLOY_CURVE};
use crate::cloud::operation_name;
use crate::state::AppState;

/// Console deployment request. `project_id` and `key_data` may be present
/// but are ignored: the server's own credential decides the project.
#[derive(Debug, Deserialize)]
pub struct DeployPayload {
    pub origin_name: String,
    pub setup_name: String,
    pub domain: String,
    #[serde(default)]
    pub setup_type: Option<String>,
    #[serde(default)]
    pub ssl_certificate: Option<String>,
    #[serde(default)]
    pub dual_token_config: Option<DualTokenConfig>,
    /// Previously fetched service document; switches to clone mode.
    #[serde(default)]
    pub original_json: Option<Value>,
}

impl DeployPayload {
    fn ssl_certificate(&self) -> Option<&str> {
        self.ssl_certificate
            .as_deref()
            .map(str::trim)
            .filter(|cert| !cert.is_empty())
    }

    /// Clone source, accepting either an object or its JSON text.
    fn clone_source(&self) -> anyhow::Result<Option<ServiceConfig>> {
        let raw = match &self.original_json {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(text)) if text.trim().is_empty() => return Ok(None),
            Some(Value::String(text)) => {
                serde_json::from_str(text).context("original_json is not valid JSON")?
            }
            Some(doc) => doc.clone(),
        };
        Ok(Some(ServiceConfig::from_value(raw)?))
    }
}

/// Resource name of an origin in the credential's project.
pub fn origin_path(project_id: &str, origin_name: &str) -> String {
    if origin_name.starts_with("projects/") {
        origin_name.to_string()
    } else {
        format!("projects/{project_id}/locations/global/edgeCacheOrigins/{origin_name}")
    }
}

/// Produce the service document for a deployment.
pub fn service_for(
    payload: &DeployPayload,
    project_id: &str,
    job: &JobHandle,
) -> anyhow::Result<ServiceConfig> {
    let origin = origin_path(project_id, &payload.origin_name);

    if let Some(source) = payload.clone_source()? {
        job.log("High-fidelity clone mode: Preserving original configuration rules and headers.")?;
        return Ok(clone_service(
            source,
            &payload.domain,
            &origin,
            payload.ssl_certificate(),
        ));
    }

    let setup_type: SetupType = payload
        .setup_type
        .as_deref()
        .ok_or_else(|| anyhow!("Invalid request: setup_type is required"))?
        .parse()?;

    let dual_token = payload.dual_token_config.clone().unwrap_or_default();
    if dual_token.enabled {
        job.log(format!(
            "Applying Dual Token Protection (Short: {}, Long: {})...",
            dual_token.short_keyset.as_deref().unwrap_or_default(),
            dual_token.long_keyset.as_deref().unwrap_or_default(),
        ))?;
    }
    let chain = TokenChain::resolve(&dual_token, project_id)?;

    let profile = DeliveryProfile::new(setup_type, payload.domain.clone(), origin)
        .with_ssl_certificate(payload.ssl_certificate().map(str::to_string))
        .with_token_chain(chain);
    Ok(build_service(&profile))
}

pub struct DeployTask {
    state: AppState,
    payload: Value,
}

impl DeployTask {
    pub fn new(state: AppState, payload: Value) -> Self {
        Self { state, payload }
    }
}

#[async_trait]
impl Task for DeployTask {
    async fn run(self, job: JobHandle) -> anyhow::Result<String> {
        let payload: DeployPayload = decode(self.payload)?;
        let cloud = &self.state.cloud;

        job.log("Authenticating with Google Cloud...")?;
        cloud.authenticate().await?;
        job.progress(10)?;

        job.log(format!("Preparing Media CDN Service: {}...", payload.setup_name))?;
        let service = service_for(&payload, cloud.project_id(), &job)?;

        job.progress(50)?;
        let body = service.to_value()?;
        let response = cloud.create_service(&payload.setup_name, &body).await?;
        let op = operation_name(&response)?;
        job.log(format!("Service deployment started. Operation: {op}"))?;

        await_operation(
            &self.state,
            &job,
            &op,
            DEPLOY_CURVE,
            "Deploying",
            "Service deployment failed:",
        )
        .await?;

        Ok("Media CDN deployed successfully!".to_string())
    }
}
