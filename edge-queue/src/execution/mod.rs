mod handle;
mod poller;
mod runner;

pub use handle::JobHandle;
pub use poller::{OperationPoller, OperationSource, OperationStatus, PollPolicy, ProgressCurve};
pub use runner::{Task, TaskRunner};
