//! Media CDN provisioning service.
//!
//! Accepts delivery intents from the operator console, turns them into
//! Edge Cache documents and runs each provider change as a background
//! job whose progress is polled over HTTP. Staging copies of production
//! services are snapshotted to a versioned bucket and can be promoted
//! back later.

pub mod app;
pub mod cloud;
pub mod config;
pub mod iam;
pub mod services;
pub mod state;
pub mod tasks;

use edge_axum::AxumApp;

pub use config::DeployerSettings;
pub use state::AppState;

pub async fn build() -> anyhow::Result<AxumApp> {
    let ax = app::deployer_app()?;
    let settings = DeployerSettings::from_app(&ax.app);
    let state = app::provider_state(settings).await?;
    Ok(mount(ax, state))
}

/// Register every route against `state` and install the HTTP layers.
pub fn mount(ax: AxumApp, state: AppState) -> AxumApp {
    ax.merge(services::router(state))
        .use_get("/health", || async { "ok" })
        .with_http_layers()
}
