use edge_auth::AuthError;
use edge_core::EdgeError;
use thiserror::Error;

/// Failures talking to the provider control plane.
#[derive(Debug, Error)]
pub enum CloudError {
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Network error: {0}")]
    Network(String),

    /// Already-exists responses are normalized; the raw body is dropped.
    #[error("GCP API Error: Resource already exists (409)")]
    Conflict,

    #[error("GCP API Error: 404 - {0}")]
    NotFound(String),

    #[error("GCP API Error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected provider response: {0}")]
    Decode(String),
}

impl CloudError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::NotFound(_))
    }
}

impl From<reqwest::Error> for CloudError {
    fn from(err: reqwest::Error) -> Self {
        CloudError::Network(err.to_string())
    }
}

impl From<CloudError> for EdgeError {
    fn from(err: CloudError) -> Self {
        let message = err.to_string();
        let edge = match &err {
            CloudError::NotFound(_) => EdgeError::not_found(message),
            _ => EdgeError::general_error(message),
        };
        edge.with_source(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_is_fixed() {
        assert_eq!(
            CloudError::Conflict.to_string(),
            "GCP API Error: Resource already exists (409)"
        );
    }

    #[test]
    fn api_error_carries_status_and_body() {
        let err = CloudError::Api {
            status: 403,
            body: "{\"error\":\"denied\"}".into(),
        };
        assert_eq!(err.to_string(), "GCP API Error: 403 - {\"error\":\"denied\"}");
    }

    #[test]
    fn not_found_maps_to_404() {
        let edge: EdgeError = CloudError::NotFound("gone".into()).into();
        assert_eq!(edge.code(), 404);

        let edge: EdgeError = CloudError::Network("reset".into()).into();
        assert_eq!(edge.code(), 500);
    }
}
