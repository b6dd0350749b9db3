use async_trait::async_trait;
use edge_queue::{JobHandle, Task};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{await_operation, decode, string_or_number, ORIGIN_CURVE};
use crate::cloud::operation_name;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OriginPayload {
    pub origin_name: String,
    pub origin_dns: String,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub port: Option<String>,
    #[serde(default)]
    pub host_header: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl OriginPayload {
    /// Edge Cache Origin body. Protocol defaults to HTTPS on port 443.
    pub fn to_body(&self) -> anyhow::Result<Value> {
        let port: u16 = match &self.port {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid request: port {port} is not a valid port"))?,
            None => 443,
        };
        let mut body = json!({
            "originAddress": self.origin_dns,
            "protocol": self.protocol.as_deref().unwrap_or("HTTPS"),
            "port": port,
            "description": self.description.as_deref().unwrap_or(""),
        });
        if let Some(host) = self.host_header.as_deref().filter(|h| !h.trim().is_empty()) {
            body["commonOverride"] = json!({ "hostHeader": host });
        }
        Ok(body)
    }
}

pub struct OriginTask {
    state: AppState,
    payload: Value,
}

impl OriginTask {
    pub fn new(state: AppState, payload: Value) -> Self {
        Self { state, payload }
    }
}

#[async_trait]
impl Task for OriginTask {
    async fn run(self, job: JobHandle) -> anyhow::Result<String> {
        let payload: OriginPayload = decode(self.payload)?;
        let body = payload.to_body()?;

        job.log("Authenticating...")?;
        self.state.cloud.authenticate().await?;
        job.progress(10)?;

        job.log(format!("Creating Edge Cache Origin: {}...", payload.origin_name))?;
        let response = self
            .state
            .cloud
            .create_origin(&payload.origin_name, &body)
            .await?;
        let op = operation_name(&response)?;
        job.log(format!("Origin creation started. Operation: {op}"))?;

        await_operation(
            &self.state,
            &job,
            &op,
            ORIGIN_CURVE,
            "Creating Origin",
            "Origin creation failed:",
        )
        .await?;

        Ok("Origin created successfully.".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(raw: Value) -> OriginPayload {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn defaults_to_https_443() {
        let body = payload(json!({"origin_name": "o", "origin_dns": "bucket.storage"}))
            .to_body()
            .unwrap();
        assert_eq!(body["protocol"], "HTTPS");
        assert_eq!(body["port"], 443);
        assert_eq!(body["originAddress"], "bucket.storage");
        assert!(body.get("commonOverride").is_none());
    }

    #[test]
    fn port_may_be_string_and_host_header_is_applied() {
        let body = payload(json!({
            "origin_name": "o",
            "origin_dns": "origin.example.com",
            "protocol": "HTTP",
            "port": "8080",
            "host_header": "media.example.com",
            "description": "live origin"
        }))
        .to_body()
        .unwrap();
        assert_eq!(body["port"], 8080);
        assert_eq!(body["protocol"], "HTTP");
        assert_eq!(body["commonOverride"]["hostHeader"], "media.example.com");
        assert_eq!(body["description"], "live origin");
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = payload(json!({"origin_name": "o", "origin_dns": "d", "port": "http"}))
            .to_body()
            .unwrap_err();
        assert!(err.to_string().contains("port"));
    }
}
