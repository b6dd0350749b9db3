use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use edge_core::EdgeError;
use serde_json::json;

use crate::EdgeAxumError;

fn map_json_rejection(rejection: JsonRejection) -> EdgeAxumError {
    EdgeError::bad_request("Failed to parse the request body as JSON")
        .with_data(json!({ "_schema": [rejection.body_text()] }))
        .into_anyhow()
        .into()
}

/// `Json<T>` whose rejections render as a `BadRequest` error body.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = EdgeAxumError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(map_json_rejection(rejection)),
        }
    }
}
