use axum::extract::{Path, State};
use axum::Json;
use edge_axum::{EdgeAxumError, JsonBody};
use edge_core::EdgeError;
use edge_queue::{JobId, JobKind, JobRecord, RegistryError, Task};
use serde_json::{json, Value};

use crate::state::AppState;
use crate::tasks::{DeployTask, OriginTask, PromoteTask, StagingTask};

fn submitted<T: Task>(state: &AppState, kind: JobKind, task: T) -> Json<Value> {
    let job_id = state.runner.submit(kind, task);
    tracing::info!(%job_id, %kind, "job submitted");
    Json(json!({ "job_id": job_id }))
}

pub async fn deploy(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Value>,
) -> Json<Value> {
    let task = DeployTask::new(state.clone(), payload);
    submitted(&state, JobKind::Deploy, task)
}

pub async fn create_origin(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Value>,
) -> Json<Value> {
    let task = OriginTask::new(state.clone(), payload);
    submitted(&state, JobKind::Origin, task)
}

pub async fn create_staging(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Value>,
) -> Json<Value> {
    let task = StagingTask::new(state.clone(), payload);
    submitted(&state, JobKind::Staging, task)
}

pub async fn promote(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Value>,
) -> Json<Value> {
    let task = PromoteTask::new(state.clone(), payload);
    submitted(&state, JobKind::Promote, task)
}

fn registry_error(err: RegistryError) -> EdgeError {
    match err {
        RegistryError::JobNotFound(id) => EdgeError::not_found(format!("Job not found: {id}")),
        RegistryError::JobAlreadyTerminal(id) => {
            EdgeError::conflict(format!("Job {id} has already finished"))
        }
    }
}

pub async fn status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobRecord>, EdgeAxumError> {
    let record = state
        .registry()
        .get(&JobId::from(job_id))
        .map_err(registry_error)?;
    Ok(Json(record))
}

pub async fn cancel(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<Value>, EdgeAxumError> {
    let job_id = JobId::from(job_id);
    state.runner.cancel(&job_id).map_err(registry_error)?;
    tracing::info!(%job_id, "job cancelled by request");
    Ok(Json(json!({ "job_id": job_id, "status": "Cancelled" })))
}
