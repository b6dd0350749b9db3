use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use edge_core::EdgeApp;
use edge_queue::PollPolicy;

/// `(config key, env var, default)`.
const SETTINGS: [(&str, &str, &str); 9] = [
    ("http.host", "HTTP_HOST", "0.0.0.0"),
    ("http.port", "HTTP_PORT", "6001"),
    ("credentials.path", "EDGE_CREDENTIALS_PATH", "credentials/key.json"),
    ("settings.path", "EDGE_SETTINGS_PATH", "credentials/settings.json"),
    ("samples.dir", "EDGE_SAMPLE_CONFIG_DIR", "sample-configs"),
    ("staging.region", "EDGE_DEFAULT_REGION", "asia-south1"),
    ("poll.interval", "EDGE_POLL_INTERVAL_SECS", "20"),
    ("poll.maxWait", "EDGE_POLL_MAX_WAIT_SECS", "3600"),
    ("http.timeout", "EDGE_HTTP_TIMEOUT_SECS", "30"),
];

/// Copy environment overrides (and defaults) into the app config.
pub fn config(app: &EdgeApp) -> Result<()> {
    for (key, var, default) in SETTINGS {
        match env::var(var) {
            Ok(value) if !value.trim().is_empty() => app.set(key, value),
            _ => app.set_default(key, default),
        }
    }
    Ok(())
}

/// Typed view of the deployer's settings.
#[derive(Debug, Clone)]
pub struct DeployerSettings {
    pub credentials_path: PathBuf,
    pub settings_path: PathBuf,
    pub sample_config_dir: PathBuf,
    pub default_region: String,
    pub poll_interval: Duration,
    /// `None` waits forever.
    pub poll_max_wait: Option<Duration>,
    pub http_timeout: Duration,
}

impl Default for DeployerSettings {
    fn default() -> Self {
        Self {
            credentials_path: PathBuf::from("credentials/key.json"),
            settings_path: PathBuf::from("credentials/settings.json"),
            sample_config_dir: PathBuf::from("sample-configs"),
            default_region: "asia-south1".into(),
            poll_interval: Duration::from_secs(20),
            poll_max_wait: Some(Duration::from_secs(3600)),
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl DeployerSettings {
    pub fn from_app(app: &EdgeApp) -> Self {
        let cfg = app.config_snapshot();
        let defaults = Self::default();

        let secs = |key: &str| cfg.get_u64(key).map(Duration::from_secs);

        Self {
            credentials_path: cfg
                .get_string("credentials.path")
                .map(PathBuf::from)
                .unwrap_or(defaults.credentials_path),
            settings_path: cfg
                .get_string("settings.path")
                .map(PathBuf::from)
                .unwrap_or(defaults.settings_path),
            sample_config_dir: cfg
                .get_string("samples.dir")
                .map(PathBuf::from)
                .unwrap_or(defaults.sample_config_dir),
            default_region: cfg
                .get_string("staging.region")
                .unwrap_or(defaults.default_region),
            poll_interval: secs("poll.interval").unwrap_or(defaults.poll_interval),
            poll_max_wait: match cfg.get_u64("poll.maxWait") {
                Some(0) => None,
                Some(n) => Some(Duration::from_secs(n)),
                None => defaults.poll_max_wait,
            },
            http_timeout: secs("http.timeout").unwrap_or(defaults.http_timeout),
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: self.poll_interval,
            max_wait: self.poll_max_wait,
        }
    }
}
