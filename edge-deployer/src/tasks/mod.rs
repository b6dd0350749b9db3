//! Background provisioning workflows, one [`Task`](edge_queue::Task) per
//! job kind. Payloads are decoded inside the task so that a bad field
//! fails the job instead of the submit request.

pub mod deploy;
pub mod origin;
pub mod promote;
pub mod staging;

pub use deploy::DeployTask;
pub use origin::OriginTask;
pub use promote::PromoteTask;
pub use staging::StagingTask;

use anyhow::anyhow;
use edge_queue::{JobHandle, PollError, ProgressCurve};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::state::AppState;

pub const ORIGIN_CURVE: ProgressCurve = ProgressCurve::new(10, 85, 95);
pub const DEPLOY_CURVE: ProgressCurve = ProgressCurve::new(50, 45, 95);
pub const STAGING_CURVE: ProgressCurve = ProgressCurve::new(10, 70, 80);
pub const PROMOTE_CURVE: ProgressCurve = ProgressCurve::new(10, 90, 95);

pub(crate) fn decode<T: DeserializeOwned>(payload: Value) -> anyhow::Result<T> {
    serde_json::from_value(payload).map_err(|err| anyhow!("Invalid request: {err}"))
}

/// Wait for operation `op`. A provider-reported error becomes
/// `"{failure} {error}"`.
pub(crate) async fn await_operation(
    state: &AppState,
    job: &JobHandle,
    op: &str,
    curve: ProgressCurve,
    label: &str,
    failure: &str,
) -> anyhow::Result<()> {
    match state
        .poller
        .wait(state.cloud.as_ref(), op, curve, label, job)
        .await
    {
        Ok(()) => Ok(()),
        Err(PollError::Failed(error)) => Err(anyhow!("{failure} {error}")),
        Err(other) => Err(other.into()),
    }
}

/// Accepts a JSON string or number and yields it as text.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
