use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SynthError {
    #[error("unknown setup_type '{0}', expected VOD or Live")]
    UnknownSetupType(String),

    #[error("dual token protection requires both short_keyset and long_keyset")]
    MissingKeyset,

    #[error("invalid service configuration: {0}")]
    InvalidDocument(String),
}
