use std::fmt;

use serde::{Deserialize, Serialize};

/// Job identifier: `{prefix}_{unix_seconds}_{sequence}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    pub fn generate(kind: JobKind, unix_secs: i64, sequence: u64) -> Self {
        Self(format!("{}_{}_{}", kind.prefix(), unix_secs, sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// The provisioning workflows a job can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Deploy,
    Origin,
    Staging,
    Promote,
}

impl JobKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            JobKind::Deploy => "job",
            JobKind::Origin => "origin",
            JobKind::Staging => "staging",
            JobKind::Promote => "promote",
        }
    }

    pub fn initial_log(&self) -> &'static str {
        match self {
            JobKind::Deploy => "Job initiated...",
            JobKind::Origin => "Origin creation initiated...",
            JobKind::Staging => "Staging creation initiated...",
            JobKind::Promote => "Promotion to production initiated...",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}
