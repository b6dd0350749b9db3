use axum::extract::{Path, Query, State};
use axum::Json;
use edge_axum::EdgeAxumError;
use edge_blob::StagingVersion;
use edge_core::EdgeError;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::cloud::ResourceKind;
use crate::state::AppState;

type JsonResult = Result<Json<Value>, EdgeAxumError>;

async fn list(state: &AppState, kind: ResourceKind) -> JsonResult {
    let listing = state
        .cloud
        .list_resources(kind)
        .await
        .map_err(EdgeError::from)?;
    Ok(Json(listing))
}

pub async fn list_origins(State(state): State<AppState>) -> JsonResult {
    list(&state, ResourceKind::Origins).await
}

pub async fn list_services(State(state): State<AppState>) -> JsonResult {
    list(&state, ResourceKind::Services).await
}

pub async fn list_keysets(State(state): State<AppState>) -> JsonResult {
    list(&state, ResourceKind::Keysets).await
}

pub async fn list_certificates(State(state): State<AppState>) -> JsonResult {
    list(&state, ResourceKind::Certificates).await
}

pub async fn list_secrets(State(state): State<AppState>) -> JsonResult {
    list(&state, ResourceKind::Secrets).await
}

pub async fn list_buckets(State(state): State<AppState>) -> JsonResult {
    let buckets = state.cloud.list_buckets().await.map_err(EdgeError::from)?;
    Ok(Json(buckets))
}

pub async fn get_service(State(state): State<AppState>, Path(id): Path<String>) -> JsonResult {
    let service = state.cloud.get_service(&id).await.map_err(EdgeError::from)?;
    Ok(Json(service))
}

pub async fn get_origin(State(state): State<AppState>, Path(id): Path<String>) -> JsonResult {
    let origin = state
        .cloud
        .get_resource(ResourceKind::Origins, &id)
        .await
        .map_err(EdgeError::from)?;
    Ok(Json(origin))
}

pub async fn delete_service(State(state): State<AppState>, Path(id): Path<String>) -> JsonResult {
    let op = state
        .cloud
        .delete_resource(ResourceKind::Services, &id)
        .await
        .map_err(EdgeError::from)?;
    tracing::info!(service = %id, "service delete requested");
    Ok(Json(op))
}

pub async fn delete_origin(State(state): State<AppState>, Path(id): Path<String>) -> JsonResult {
    let op = state
        .cloud
        .delete_resource(ResourceKind::Origins, &id)
        .await
        .map_err(EdgeError::from)?;
    tracing::info!(origin = %id, "origin delete requested");
    Ok(Json(op))
}

#[derive(Debug, Deserialize)]
pub struct VersionsQuery {
    pub service: Option<String>,
}

/// Snapshot history, newest first. A listing failure (typically the
/// bucket not existing yet) yields an empty list.
pub async fn list_versions(
    State(state): State<AppState>,
    Query(query): Query<VersionsQuery>,
) -> JsonResult {
    let service = query
        .service
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| EdgeError::bad_request("Service ID is required"))?;

    let bucket = state.system_bucket().await?;
    let listed = state.versions.list_versions(&bucket, &service).await;
    let versions: Vec<StagingVersion> = match listed {
        Ok(versions) => versions,
        Err(err) => {
            state.counters.version_list_failed();
            tracing::warn!(%bucket, %service, error = %err, "listing staging versions failed");
            Vec::new()
        }
    };
    Ok(Json(json!({ "versions": versions })))
}
