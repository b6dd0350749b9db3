mod metrics;

pub use metrics::{JobMetrics, JobMetricsSnapshot};
