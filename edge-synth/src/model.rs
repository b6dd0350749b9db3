//! Typed Edge Cache Service document.
//!
//! Every struct keeps unrecognised keys in `extra`, so a fetched
//! configuration survives a read/modify/write cycle with its headers,
//! rewrites and other settings intact. Enumerations keep unknown wire
//! values as `Other`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Other(raw) => raw.as_str(),
                }
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                match raw {
                    $($wire => Self::$variant,)+
                    other => Self::Other(other.to_string()),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Ok(Self::from(raw.as_str()))
            }
        }
    };
}

wire_enum!(CacheMode {
    CacheAllStatic => "CACHE_ALL_STATIC",
    UseOriginHeaders => "USE_ORIGIN_HEADERS",
    ForceCacheAll => "FORCE_CACHE_ALL",
    BypassCache => "BYPASS_CACHE",
});

wire_enum!(SignedRequestMode {
    Disabled => "DISABLED",
    RequireSignatures => "REQUIRE_SIGNATURES",
    RequireTokens => "REQUIRE_TOKENS",
});

wire_enum!(SignatureAction {
    GenerateCookie => "GENERATE_COOKIE",
    GenerateTokenHlsCookieless => "GENERATE_TOKEN_HLS_COOKIELESS",
    PropagateTokenHlsCookieless => "PROPAGATE_TOKEN_HLS_COOKIELESS",
});

wire_enum!(
    /// Token signature algorithm. HMAC variants are accepted by the edge
    /// without being listed explicitly.
    SignatureAlgorithm {
        Ed25519 => "ED25519",
        HmacSha256 => "HMAC_SHA_256",
        HmacSha1 => "HMAC_SHA1",
    }
);

impl SignatureAlgorithm {
    pub fn is_hmac(&self) -> bool {
        self.as_str().starts_with("HMAC")
    }
}

impl Default for SignatureAlgorithm {
    fn default() -> Self {
        Self::HmacSha256
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4_addresses: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6_addresses: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<Routing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_config: Option<LogConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_ssl_certificates: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServiceConfig {
    pub fn from_value(value: Value) -> Result<Self, crate::SynthError> {
        serde_json::from_value(value).map_err(|e| crate::SynthError::InvalidDocument(e.to_string()))
    }

    pub fn to_value(&self) -> Result<Value, crate::SynthError> {
        serde_json::to_value(self).map_err(|e| crate::SynthError::InvalidDocument(e.to_string()))
    }

    pub fn host_rules(&self) -> &[HostRule] {
        self.routing
            .as_ref()
            .map(|r| r.host_rules.as_slice())
            .unwrap_or_default()
    }

    pub fn route_rules(&self) -> impl Iterator<Item = &RouteRule> {
        self.routing
            .iter()
            .flat_map(|r| r.path_matchers.iter())
            .flat_map(|pm| pm.route_rules.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Routing {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub host_rules: Vec<HostRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path_matchers: Vec<PathMatcher>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRule {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path_matcher: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathMatcher {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub route_rules: Vec<RouteRule>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// int64 on the wire, rendered as a decimal string.
    #[serde(
        default,
        deserialize_with = "priority_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub priority: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_rules: Vec<MatchRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_action: Option<RouteAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_methods: Option<RouteMethods>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RouteRule {
    pub fn cdn_policy(&self) -> Option<&CdnPolicy> {
        self.route_action.as_ref()?.cdn_policy.as_ref()
    }
}

fn priority_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "priority must be a string or integer, got {other}"
        ))),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_template_match: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_case: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdn_policy: Option<CdnPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cors_policy: Option<CorsPolicy>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdnPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_mode: Option<CacheMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_ttl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ttl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_key_policy: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_request_mode: Option<SignedRequestMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_request_keyset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_request_maximum_expiration_ttl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_signatures: Option<AddSignatures>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_token_options: Option<SignedTokenOptions>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSignatures {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<SignatureAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_query_parameter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_ttl: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub copied_parameters: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTokenOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_query_parameter: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_signature_algorithms: Vec<SignatureAlgorithm>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorsPolicy {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allow_origins: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allow_methods: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allow_headers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expose_headers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_credentials: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMethods {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_methods: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
