mod events;
mod ids;
mod record;

pub use events::JobEvent;
pub use ids::{JobId, JobKind};
pub use record::{
    JobRecord, JobState, STATUS_CANCELLED, STATUS_FAILED, STATUS_STARTING, STATUS_SUCCESS,
};
