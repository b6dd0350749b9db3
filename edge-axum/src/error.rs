use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use edge_core::EdgeError;

#[derive(Debug)]
pub struct EdgeAxumError(pub anyhow::Error);

impl<E> From<E> for EdgeAxumError
where
    E: Into<anyhow::Error>,
{
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for EdgeAxumError {
    fn into_response(self) -> Response {
        // An EdgeError anywhere in the chain keeps its status and fields
        let edge = match self.0.chain().find_map(|e| e.downcast_ref::<EdgeError>()) {
            Some(edge) => edge.sanitize_for_client(),
            None => EdgeError::general_error(format!("{:#}", self.0)),
        };

        let status =
            StatusCode::from_u16(edge.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, Json(edge.to_json())).into_response()
    }
}
