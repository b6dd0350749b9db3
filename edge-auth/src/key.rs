use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::AuthError;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Service account JSON key as downloaded from the console.
///
/// Unknown fields are kept in `extra` so the key file can be echoed back
/// unchanged.
#[derive(Clone, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_json(raw: &str) -> Result<Self, AuthError> {
        let key: ServiceAccountKey =
            serde_json::from_str(raw).map_err(|e| AuthError::InvalidKey(e.to_string()))?;
        if key.project_id.is_empty() || key.client_email.is_empty() {
            return Err(AuthError::InvalidKey(
                "project_id and client_email are required".to_string(),
            ));
        }
        Ok(key)
    }

    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, AuthError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| AuthError::Read {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_json(&raw)
    }
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}
