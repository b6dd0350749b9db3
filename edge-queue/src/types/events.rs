use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{JobId, JobKind};

/// Lifecycle events broadcast by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JobEvent {
    Created {
        job_id: JobId,
        kind: JobKind,
        at: DateTime<Utc>,
    },
    Progress {
        job_id: JobId,
        progress: u8,
        status: String,
        at: DateTime<Utc>,
    },
    Succeeded {
        job_id: JobId,
        at: DateTime<Utc>,
    },
    Failed {
        job_id: JobId,
        error: String,
        at: DateTime<Utc>,
    },
    Cancelled {
        job_id: JobId,
        at: DateTime<Utc>,
    },
}

impl JobEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "job.created",
            Self::Progress { .. } => "job.progress",
            Self::Succeeded { .. } => "job.succeeded",
            Self::Failed { .. } => "job.failed",
            Self::Cancelled { .. } => "job.cancelled",
        }
    }

    pub fn job_id(&self) -> &JobId {
        match self {
            Self::Created { job_id, .. }
            | Self::Progress { job_id, .. }
            | Self::Succeeded { job_id, .. }
            | Self::Failed { job_id, .. }
            | Self::Cancelled { job_id, .. } => job_id,
        }
    }
}
