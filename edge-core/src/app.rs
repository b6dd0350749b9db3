use std::sync::{Arc, RwLock};

use crate::{EdgeConfig, EdgeConfigSnapshot};

struct EdgeAppInner {
    name: String,
    config: RwLock<EdgeConfig>,
}

/// EdgeApp is the central application container.
///
/// Framework-agnostic; the HTTP layer holds it behind an `Arc` and
/// handlers read settings through [`EdgeApp::config_snapshot`].
#[derive(Clone)]
pub struct EdgeApp {
    inner: Arc<EdgeAppInner>,
}

impl EdgeApp {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(EdgeAppInner {
                name: name.into(),
                config: RwLock::new(EdgeConfig::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        if let Ok(mut cfg) = self.inner.config.write() {
            cfg.set(key, value);
        }
    }

    pub fn set_default<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        if let Ok(mut cfg) = self.inner.config.write() {
            cfg.set_default(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner
            .config
            .read()
            .ok()
            .and_then(|cfg| cfg.get(key).map(str::to_string))
    }

    pub fn config_snapshot(&self) -> EdgeConfigSnapshot {
        self.inner
            .config
            .read()
            .map(|cfg| cfg.snapshot())
            .unwrap_or_default()
    }
}
