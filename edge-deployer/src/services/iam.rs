use axum::extract::{Query, State};
use axum::Json;
use edge_axum::{EdgeAxumError, JsonBody};
use edge_core::EdgeError;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::iam::{fill_service_account, CHECK_ROLES, GRANT_ROLES, SERVICE_IDENTITIES};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BucketRequest {
    #[serde(default)]
    pub bucket: Option<String>,
}

impl BucketRequest {
    fn bucket(self) -> Result<String, EdgeError> {
        self.bucket
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .ok_or_else(|| EdgeError::bad_request("Bucket name is required"))
    }
}

/// Give the edge fill account read access to an origin bucket.
pub async fn grant_bucket(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<BucketRequest>,
) -> Result<Json<Value>, EdgeAxumError> {
    let bucket = request.bucket()?;
    let cloud = &state.cloud;
    cloud.authenticate().await.map_err(EdgeError::from)?;

    // service agents may already exist; any failure here is non-fatal
    for service in SERVICE_IDENTITIES {
        if let Err(err) = cloud.generate_service_identity(service).await {
            state.counters.identity_bootstrap_failed();
            tracing::warn!(service, error = %err, "service identity bootstrap failed");
        }
    }

    let number = cloud.project_number().await.map_err(EdgeError::from)?;
    let accounts = vec![fill_service_account(&number)];

    let mut policy = cloud.get_bucket_iam(&bucket).await.map_err(EdgeError::from)?;
    policy.grant(&accounts, &GRANT_ROLES);
    cloud
        .set_bucket_iam(&bucket, &policy)
        .await
        .map_err(EdgeError::from)?;

    tracing::info!(%bucket, "bucket access granted");
    Ok(Json(json!({ "status": "Success" })))
}

pub async fn check_bucket(
    State(state): State<AppState>,
    Query(request): Query<BucketRequest>,
) -> Result<Json<Value>, EdgeAxumError> {
    let bucket = request.bucket()?;
    let cloud = &state.cloud;

    let number = cloud.project_number().await.map_err(EdgeError::from)?;
    let accounts = vec![fill_service_account(&number)];
    let policy = cloud.get_bucket_iam(&bucket).await.map_err(EdgeError::from)?;

    Ok(Json(json!({
        "has_access": policy.grants_any(&accounts, &CHECK_ROLES),
        "service_accounts": accounts,
        "roles_checked": CHECK_ROLES,
    })))
}
