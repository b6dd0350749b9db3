use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{SignatureAlgorithm, SynthError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SetupType {
    #[serde(rename = "VOD")]
    Vod,
    #[serde(rename = "Live")]
    Live,
}

impl FromStr for SetupType {
    type Err = SynthError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "vod" => Ok(Self::Vod),
            "live" => Ok(Self::Live),
            _ => Err(SynthError::UnknownSetupType(raw.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for SetupType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Dual-token options as submitted by the console.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DualTokenConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub short_keyset: Option<String>,
    #[serde(default)]
    pub long_keyset: Option<String>,
    #[serde(default)]
    pub signature_algorithm: Option<SignatureAlgorithm>,
    #[serde(default)]
    pub child_use_short_token: bool,
}

/// A validated MASTER/CHILD/SEGMENT signing chain with full keyset paths.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenChain {
    pub short_keyset: String,
    pub long_keyset: String,
    pub algorithm: SignatureAlgorithm,
    pub child_use_short_token: bool,
}

impl TokenChain {
    /// `Ok(None)` when signing is disabled.
    pub fn resolve(
        config: &DualTokenConfig,
        project_id: &str,
    ) -> Result<Option<TokenChain>, SynthError> {
        if !config.enabled {
            return Ok(None);
        }
        let short = non_empty(config.short_keyset.as_deref()).ok_or(SynthError::MissingKeyset)?;
        let long = non_empty(config.long_keyset.as_deref()).ok_or(SynthError::MissingKeyset)?;

        Ok(Some(TokenChain {
            short_keyset: keyset_path(project_id, short),
            long_keyset: keyset_path(project_id, long),
            algorithm: config.signature_algorithm.clone().unwrap_or_default(),
            child_use_short_token: config.child_use_short_token,
        }))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Full resource name for a keyset; already-qualified names pass through.
pub fn keyset_path(project_id: &str, keyset: &str) -> String {
    if keyset.starts_with("projects/") {
        keyset.to_string()
    } else {
        format!("projects/{project_id}/locations/global/edgeCacheKeysets/{keyset}")
    }
}

/// Everything the synthesizer needs for a fresh build.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryProfile {
    pub setup_type: SetupType,
    pub domain: String,
    /// Full Edge Cache Origin resource name.
    pub origin: String,
    pub ssl_certificate: Option<String>,
    pub token_chain: Option<TokenChain>,
}

impl DeliveryProfile {
    pub fn new(
        setup_type: SetupType,
        domain: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            setup_type,
            domain: domain.into(),
            origin: origin.into(),
            ssl_certificate: None,
            token_chain: None,
        }
    }

    pub fn with_ssl_certificate(mut self, certificate: Option<String>) -> Self {
        self.ssl_certificate = certificate.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_token_chain(mut self, chain: Option<TokenChain>) -> Self {
        self.token_chain = chain;
        self
    }
}
