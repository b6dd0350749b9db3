//! HTTP surface for the operator console.

pub mod iam;
pub mod jobs;
pub mod resources;
pub mod system;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router<()> {
    Router::new()
        .route("/api/deploy", post(jobs::deploy))
        .route("/api/origin", post(jobs::create_origin))
        .route(
            "/api/origins",
            get(resources::list_origins).post(jobs::create_origin),
        )
        .route("/api/staging/create", post(jobs::create_staging))
        .route("/api/staging/promote", post(jobs::promote))
        .route("/api/staging/versions", get(resources::list_versions))
        .route("/api/status/{job_id}", get(jobs::status))
        .route("/api/status/{job_id}/cancel", post(jobs::cancel))
        .route("/api/services", get(resources::list_services))
        .route("/api/keysets", get(resources::list_keysets))
        .route("/api/certificates", get(resources::list_certificates))
        .route("/api/secrets", get(resources::list_secrets))
        .route("/api/buckets", get(resources::list_buckets))
        .route(
            "/api/service/{id}",
            get(resources::get_service).delete(resources::delete_service),
        )
        .route(
            "/api/origin/{id}",
            get(resources::get_origin).delete(resources::delete_origin),
        )
        .route("/api/iam/grant-bucket", post(iam::grant_bucket))
        .route("/api/iam/check-bucket", get(iam::check_bucket))
        .route("/api/config", get(system::credentials))
        .route("/api/metrics", get(system::metrics))
        .with_state(state)
}
