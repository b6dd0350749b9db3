use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to read credentials file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid credentials: {0}")]
    InvalidKey(String),

    #[error("failed to sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("token exchange request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("token exchange rejected ({status}): {body}")]
    Rejected { status: u16, body: String },
}
