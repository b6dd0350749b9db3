//! # edge-queue
//!
//! In-process background jobs for provisioning workflows.
//!
//! - [`JobRegistry`]: concurrent store of job records, one writer per job
//!   and any number of readers
//! - [`TaskRunner`]: spawns one task per job and turns its outcome into
//!   the terminal record state
//! - [`OperationPoller`]: waits on a provider long-running operation,
//!   reporting synthetic progress, bounded by a wait budget and the
//!   job's cancellation token

pub mod error;
pub mod execution;
pub mod observability;
pub mod registry;
pub mod types;

pub use error::{PollError, RegistryError, RegistryResult};
pub use execution::{
    JobHandle, OperationPoller, OperationSource, OperationStatus, PollPolicy, ProgressCurve, Task,
    TaskRunner,
};
pub use observability::{JobMetrics, JobMetricsSnapshot};
pub use registry::{JobRegistry, JobUpdate};
pub use types::{JobEvent, JobId, JobKind, JobRecord, JobState};
