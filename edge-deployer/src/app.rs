use std::sync::Arc;

use anyhow::{Context, Result};
use edge_auth::{ServiceAccountKey, ServiceAccountTokenSource, TokenSource};
use edge_axum::{axum, AxumApp};
use edge_blob::{GcsStore, VersionStore};
use edge_core::EdgeApp;

use crate::cloud::HttpCloudClient;
use crate::config::{self, DeployerSettings};
use crate::state::AppState;

pub const APP_NAME: &str = "edge-deployer";

pub fn deployer_app() -> Result<AxumApp> {
    let app = EdgeApp::new(APP_NAME);
    config::config(&app)?;
    Ok(axum(app))
}

/// Wire the provider clients from the service-account key on disk.
pub async fn provider_state(settings: DeployerSettings) -> Result<AppState> {
    let key = ServiceAccountKey::from_file(&settings.credentials_path)
        .await
        .with_context(|| {
            format!(
                "loading service account key from {}",
                settings.credentials_path.display()
            )
        })?;
    tracing::info!(project = %key.project_id, account = %key.client_email, "credentials loaded");

    let http = reqwest::Client::builder()
        .timeout(settings.http_timeout)
        .build()?;
    let project_id = key.project_id.clone();
    let tokens: Arc<dyn TokenSource> = Arc::new(ServiceAccountTokenSource::new(key, http.clone()));

    let cloud = HttpCloudClient::new(http.clone(), tokens.clone(), project_id.clone());
    let store = GcsStore::new(http, tokens, project_id);

    Ok(AppState::new(
        settings,
        Arc::new(cloud),
        Arc::new(VersionStore::new(Arc::new(store))),
    ))
}
