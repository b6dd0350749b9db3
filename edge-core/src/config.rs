//! # Configuration
//!
//! A minimal string key/value store mirroring Feathers' `app.set()` /
//! `app.get()`. Loaders (environment, dotenv files) live in the
//! applications; typed reads go through [`EdgeConfigSnapshot`].
//!
//! ```rust
//! use edge_core::EdgeConfig;
//! let mut config = EdgeConfig::new();
//! config.set("poll.interval_secs", "20");
//! assert_eq!(config.snapshot().get_u64("poll.interval_secs"), Some(20));
//! ```

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct EdgeConfig {
    values: HashMap<String, String>,
}

impl EdgeConfig {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Set only when the key is still absent.
    pub fn set_default<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.entry(key.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn snapshot(&self) -> EdgeConfigSnapshot {
        EdgeConfigSnapshot::new(self.values.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct EdgeConfigSnapshot {
    map: HashMap<String, String>,
}

impl EdgeConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }
}
