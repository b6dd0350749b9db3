use anyhow::Result;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str =
    "edge_deployer=info,edge_queue=info,edge_blob=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let ax = edge_deployer::build().await?;

    let host = ax
        .app
        .get("http.host")
        .unwrap_or_else(|| "0.0.0.0".to_string());
    let port = ax.app.get("http.port").unwrap_or_else(|| "6001".to_string());
    let addr = format!("{host}:{port}");

    tracing::info!("edge-deployer listening on http://{addr}");
    ax.listen(addr).await?;

    Ok(())
}
