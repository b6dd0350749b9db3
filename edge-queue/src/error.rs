use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Job {0} is already in a terminal state")]
    JobAlreadyTerminal(String),
}

/// Why an operation wait ended without success.
#[derive(Error, Debug)]
pub enum PollError {
    /// The operation finished with an error payload.
    #[error("{0}")]
    Failed(Value),

    #[error("operation did not complete within {0:?}")]
    TimedOut(Duration),

    #[error("operation wait was cancelled")]
    Cancelled,

    #[error(transparent)]
    Source(anyhow::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
