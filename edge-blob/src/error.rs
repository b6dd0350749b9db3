use thiserror::Error;

/// Result type for blob operations
pub type BlobResult<T> = Result<T, BlobError>;

#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Bucket already exists: {bucket}")]
    BucketExists { bucket: String },

    #[error("Bucket not found: {bucket}")]
    BucketNotFound { bucket: String },

    #[error("Object not found: {key} (generation {generation})")]
    NotFound { key: String, generation: String },

    #[error("Storage API error: {status} - {body}")]
    Http { status: u16, body: String },

    #[error("Storage authentication failed: {source}")]
    Auth {
        #[from]
        source: edge_auth::AuthError,
    },

    #[error("Storage request failed: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl BlobError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::BucketNotFound { .. })
    }
}
