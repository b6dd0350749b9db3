//! # edge-synth
//!
//! Turns a streaming delivery profile (VOD or live, optional dual-token
//! signing) into an Edge Cache Service document, and rewrites fetched
//! documents for clone, staging and promotion flows.
//!
//! ```rust
//! use edge_synth::{build_service, DeliveryProfile, SetupType};
//!
//! let profile = DeliveryProfile::new(
//!     SetupType::Vod,
//!     "cdn.example.com",
//!     "projects/p/locations/global/edgeCacheOrigins/o",
//! );
//! let service = build_service(&profile);
//! assert_eq!(service.host_rules()[0].hosts, vec!["cdn.example.com"]);
//! ```

mod build;
mod catalogue;
mod clone;
mod error;
mod model;
mod profile;

pub use build::{build_route_rules, build_service, PATH_MATCHER};
pub use catalogue::{catalogue, RuleTemplate, TokenRole, LIVE_RULES, VOD_RULES};
pub use clone::{clone_service, strip_server_fields, SERVER_FIELDS};
pub use error::SynthError;
pub use model::{
    AddSignatures, CacheMode, CdnPolicy, CorsPolicy, HostRule, LogConfig, MatchRule, PathMatcher,
    RouteAction, RouteMethods, RouteRule, Routing, ServiceConfig, SignatureAction,
    SignatureAlgorithm, SignedRequestMode, SignedTokenOptions,
};
pub use profile::{keyset_path, DeliveryProfile, DualTokenConfig, SetupType, TokenChain};
