use axum::extract::State;
use axum::Json;
use edge_axum::EdgeAxumError;
use edge_core::EdgeError;
use serde_json::{json, Value};

use crate::state::AppState;

const REDACTED_KEY_FIELDS: [&str; 2] = ["private_key", "private_key_id"];

/// The stored service-account document, without its key material.
pub async fn credentials(State(state): State<AppState>) -> Result<Json<Value>, EdgeAxumError> {
    let path = &state.settings.credentials_path;
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| EdgeError::not_found(format!("Credentials not available: {err}")))?;
    let mut doc: Value = serde_json::from_str(&raw)
        .map_err(|err| EdgeError::not_found(format!("Credentials not readable: {err}")))?;

    if let Some(fields) = doc.as_object_mut() {
        for field in REDACTED_KEY_FIELDS {
            fields.remove(field);
        }
    }
    Ok(Json(doc))
}

pub async fn metrics(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "jobs": state.registry().metrics().snapshot(),
        "active_jobs": state.runner.active_jobs(),
        "policies": state.counters.snapshot(),
        "skipped_versions": state.versions.skipped_versions(),
    }))
}
