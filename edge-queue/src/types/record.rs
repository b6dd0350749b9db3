use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{JobId, JobKind};

pub const STATUS_STARTING: &str = "Starting";
pub const STATUS_SUCCESS: &str = "Success";
pub const STATUS_FAILED: &str = "Failed";
pub const STATUS_CANCELLED: &str = "Cancelled";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Starting,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

/// Pollable job state. `status` doubles as the human progress message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: JobId,
    pub kind: JobKind,
    pub state: JobState,
    pub status: String,
    pub progress: u8,
    pub logs: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn new(job_id: JobId, kind: JobKind) -> Self {
        let now = Utc::now();
        Self {
            job_id,
            kind,
            state: JobState::Starting,
            status: STATUS_STARTING.to_string(),
            progress: 0,
            logs: vec![kind.initial_log().to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
