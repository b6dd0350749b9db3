use serde_json::Map;

use crate::catalogue::{catalogue, RuleTemplate, TokenRole};
use crate::{
    AddSignatures, CacheMode, CdnPolicy, CorsPolicy, DeliveryProfile, HostRule, LogConfig,
    MatchRule, PathMatcher, RouteAction, RouteMethods, RouteRule, Routing, ServiceConfig,
    SetupType, SignatureAction, SignedRequestMode, SignedTokenOptions, TokenChain,
};

pub const PATH_MATCHER: &str = "path-matcher-0";

const SHORT_TOKEN_PARAM: &str = "hdnts";
const LONG_TOKEN_PARAM: &str = "hdntl";
const CLIENT_TTL: &str = "1s";
const MASTER_MAX_EXPIRATION_TTL: &str = "3600s";
const LONG_TOKEN_TTL: &str = "86400s";
const COPIED_PARAMETERS: [&str; 6] = [
    "data",
    "Data",
    "Headers",
    "PathGlobs",
    "SessionID",
    "URLPrefix",
];
const ALLOWED_METHODS: [&str; 3] = ["GET", "HEAD", "OPTIONS"];

/// Fresh service document for a delivery profile.
pub fn build_service(profile: &DeliveryProfile) -> ServiceConfig {
    let route_rules = build_route_rules(
        profile.setup_type,
        &profile.origin,
        profile.token_chain.as_ref(),
    );

    ServiceConfig {
        routing: Some(Routing {
            host_rules: vec![HostRule {
                hosts: vec![profile.domain.clone()],
                path_matcher: PATH_MATCHER.to_string(),
                extra: Map::new(),
            }],
            path_matchers: vec![PathMatcher {
                name: PATH_MATCHER.to_string(),
                route_rules,
                extra: Map::new(),
            }],
            extra: Map::new(),
        }),
        log_config: Some(LogConfig {
            enable: Some(true),
            sample_rate: Some(1.0),
            extra: Map::new(),
        }),
        edge_ssl_certificates: profile.ssl_certificate.clone().map(|cert| vec![cert]),
        ..ServiceConfig::default()
    }
}

/// Ordered rules of the profile's catalogue, all pointing at `origin`.
pub fn build_route_rules(
    setup_type: SetupType,
    origin: &str,
    chain: Option<&TokenChain>,
) -> Vec<RouteRule> {
    catalogue(setup_type)
        .iter()
        .map(|template| route_rule(template, origin, chain))
        .collect()
}

fn route_rule(template: &RuleTemplate, origin: &str, chain: Option<&TokenChain>) -> RouteRule {
    let mut cdn_policy = CdnPolicy {
        cache_mode: Some(CacheMode::ForceCacheAll),
        default_ttl: Some(template.default_ttl.to_string()),
        client_ttl: Some(CLIENT_TTL.to_string()),
        cache_key_policy: Some(Map::new()),
        signed_request_mode: Some(SignedRequestMode::Disabled),
        ..CdnPolicy::default()
    };

    if let (Some(chain), Some(role)) = (chain, template.role) {
        apply_token_role(&mut cdn_policy, role, chain);
    }

    RouteRule {
        description: Some(template.description.to_string()),
        priority: template.priority.to_string(),
        origin: Some(origin.to_string()),
        match_rules: vec![MatchRule {
            path_template_match: Some(template.pattern.to_string()),
            ignore_case: Some(true),
            extra: Map::new(),
        }],
        route_action: Some(RouteAction {
            cdn_policy: Some(cdn_policy),
            cors_policy: Some(permissive_cors()),
            extra: Map::new(),
        }),
        route_methods: Some(RouteMethods {
            allowed_methods: to_strings(&ALLOWED_METHODS),
            extra: Map::new(),
        }),
        extra: Map::new(),
    }
}

fn apply_token_role(policy: &mut CdnPolicy, role: TokenRole, chain: &TokenChain) {
    policy.signed_request_mode = Some(SignedRequestMode::RequireTokens);
    // HMAC keys are accepted by default; other algorithms must be listed.
    let listed_algorithms = if chain.algorithm.is_hmac() {
        Vec::new()
    } else {
        vec![chain.algorithm.clone()]
    };

    match role {
        TokenRole::Master => {
            policy.signed_request_keyset = Some(chain.short_keyset.clone());
            policy.signed_request_maximum_expiration_ttl =
                Some(MASTER_MAX_EXPIRATION_TTL.to_string());
            policy.add_signatures = Some(AddSignatures {
                actions: vec![SignatureAction::GenerateTokenHlsCookieless],
                keyset: Some(chain.long_keyset.clone()),
                token_query_parameter: Some(LONG_TOKEN_PARAM.to_string()),
                token_ttl: Some(LONG_TOKEN_TTL.to_string()),
                copied_parameters: to_strings(&COPIED_PARAMETERS),
                extra: Map::new(),
            });
            // the requester-facing token always names its algorithm
            policy.signed_token_options = Some(SignedTokenOptions {
                token_query_parameter: Some(SHORT_TOKEN_PARAM.to_string()),
                allowed_signature_algorithms: vec![chain.algorithm.clone()],
                extra: Map::new(),
            });
        }
        TokenRole::Child => {
            let (keyset, param) = if chain.child_use_short_token {
                (&chain.short_keyset, SHORT_TOKEN_PARAM)
            } else {
                (&chain.long_keyset, LONG_TOKEN_PARAM)
            };
            policy.signed_request_keyset = Some(keyset.clone());
            policy.add_signatures = Some(AddSignatures {
                actions: vec![SignatureAction::PropagateTokenHlsCookieless],
                token_query_parameter: Some(LONG_TOKEN_PARAM.to_string()),
                ..AddSignatures::default()
            });
            policy.signed_token_options = Some(SignedTokenOptions {
                token_query_parameter: Some(param.to_string()),
                allowed_signature_algorithms: listed_algorithms,
                extra: Map::new(),
            });
        }
        TokenRole::Segment => {
            policy.signed_request_keyset = Some(chain.long_keyset.clone());
            policy.signed_token_options = Some(SignedTokenOptions {
                token_query_parameter: Some(LONG_TOKEN_PARAM.to_string()),
                allowed_signature_algorithms: listed_algorithms,
                extra: Map::new(),
            });
        }
    }
}

fn permissive_cors() -> CorsPolicy {
    let any = vec!["*".to_string()];
    CorsPolicy {
        allow_origins: any.clone(),
        allow_methods: any.clone(),
        allow_headers: any.clone(),
        expose_headers: any,
        max_age: Some("600s".to_string()),
        allow_credentials: Some(true),
        extra: Map::new(),
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SignatureAlgorithm, TokenChain};

    const ORIGIN: &str = "projects/p/locations/global/edgeCacheOrigins/vod-origin";

    fn chain(child_use_short_token: bool, algorithm: SignatureAlgorithm) -> TokenChain {
        TokenChain {
            short_keyset: "projects/p/locations/global/edgeCacheKeysets/short".into(),
            long_keyset: "projects/p/locations/global/edgeCacheKeysets/long".into(),
            algorithm,
            child_use_short_token,
        }
    }

    fn rule<'a>(service: &'a ServiceConfig, description: &str) -> &'a RouteRule {
        service
            .route_rules()
            .find(|r| r.description.as_deref() == Some(description))
            .unwrap()
    }

    #[test]
    fn vod_without_tokens_has_seven_unsigned_rules() {
        let profile = DeliveryProfile::new(SetupType::Vod, "cdn.example.com", ORIGIN);
        let service = build_service(&profile);

        let priorities: Vec<_> = service.route_rules().map(|r| r.priority.as_str()).collect();
        assert_eq!(priorities, vec!["1", "2", "3", "47", "48", "49", "100"]);
        assert!(service.route_rules().all(|r| {
            r.cdn_policy().unwrap().signed_request_mode != Some(SignedRequestMode::RequireTokens)
        }));
        assert!(service.edge_ssl_certificates.is_none());

        let json = service.to_value().unwrap();
        assert!(!json.to_string().contains("REQUIRE_TOKENS"));
        assert_eq!(json["routing"]["hostRules"][0]["hosts"][0], "cdn.example.com");
        assert_eq!(json["routing"]["hostRules"][0]["pathMatcher"], PATH_MATCHER);
        assert_eq!(json["logConfig"]["sampleRate"], 1.0);
    }

    #[test]
    fn every_rule_carries_cors_methods_and_origin() {
        let profile = DeliveryProfile::new(SetupType::Live, "live.example.com", ORIGIN);
        let json = build_service(&profile).to_value().unwrap();
        let rules = json["routing"]["pathMatchers"][0]["routeRules"].as_array().unwrap();

        assert_eq!(rules.len(), 6);
        for rule in rules {
            assert_eq!(rule["origin"], ORIGIN);
            assert_eq!(rule["matchRules"][0]["ignoreCase"], true);
            assert_eq!(
                rule["routeMethods"]["allowedMethods"],
                serde_json::json!(["GET", "HEAD", "OPTIONS"])
            );
            let cors = &rule["routeAction"]["corsPolicy"];
            assert_eq!(cors["allowOrigins"], serde_json::json!(["*"]));
            assert_eq!(cors["maxAge"], "600s");
            assert_eq!(cors["allowCredentials"], true);
            assert_eq!(rule["routeAction"]["cdnPolicy"]["cacheKeyPolicy"], serde_json::json!({}));
        }
    }

    #[test]
    fn live_ttls_follow_catalogue() {
        let profile = DeliveryProfile::new(SetupType::Live, "live.example.com", ORIGIN);
        let service = build_service(&profile);
        let ttl = |d: &str| rule(&service, d).cdn_policy().unwrap().default_ttl.clone().unwrap();

        assert_eq!(ttl("Live Master Manifest"), "86400s");
        assert_eq!(ttl("Live Child Playlist"), "2s");
        assert_eq!(ttl("Live Media Chunks"), "31536000s");
        assert_eq!(ttl("Live DASH Manifest"), "2s");
    }

    #[test]
    fn master_rule_requires_short_and_mints_long() {
        let profile = DeliveryProfile::new(SetupType::Vod, "cdn.example.com", ORIGIN)
            .with_token_chain(Some(chain(false, SignatureAlgorithm::HmacSha256)));
        let service = build_service(&profile);
        let policy = rule(&service, "Master Manifest").cdn_policy().unwrap();

        assert_eq!(policy.signed_request_mode, Some(SignedRequestMode::RequireTokens));
        assert!(policy.signed_request_keyset.as_deref().unwrap().ends_with("/short"));
        assert_eq!(policy.signed_request_maximum_expiration_ttl.as_deref(), Some("3600s"));

        let add = policy.add_signatures.as_ref().unwrap();
        assert_eq!(add.actions, vec![SignatureAction::GenerateTokenHlsCookieless]);
        assert!(add.keyset.as_deref().unwrap().ends_with("/long"));
        assert_eq!(add.token_query_parameter.as_deref(), Some("hdntl"));
        assert_eq!(add.token_ttl.as_deref(), Some("86400s"));
        assert_eq!(add.copied_parameters.len(), 6);

        let opts = policy.signed_token_options.as_ref().unwrap();
        assert_eq!(opts.token_query_parameter.as_deref(), Some("hdnts"));
        assert_eq!(opts.allowed_signature_algorithms, vec![SignatureAlgorithm::HmacSha256]);
    }

    #[test]
    fn child_rule_uses_short_keyset_when_flagged() {
        let profile = DeliveryProfile::new(SetupType::Vod, "cdn.example.com", ORIGIN)
            .with_token_chain(Some(chain(true, SignatureAlgorithm::HmacSha256)));
        let service = build_service(&profile);
        let policy = rule(&service, "Child Playlist").cdn_policy().unwrap();

        assert!(policy.signed_request_keyset.as_deref().unwrap().ends_with("/short"));
        let opts = policy.signed_token_options.as_ref().unwrap();
        assert_eq!(opts.token_query_parameter.as_deref(), Some("hdnts"));
        assert!(opts.allowed_signature_algorithms.is_empty());

        let add = policy.add_signatures.as_ref().unwrap();
        assert_eq!(add.actions, vec![SignatureAction::PropagateTokenHlsCookieless]);
        assert_eq!(add.token_query_parameter.as_deref(), Some("hdntl"));
        assert!(add.keyset.is_none());
    }

    #[test]
    fn child_and_segment_default_to_long_token() {
        let profile = DeliveryProfile::new(SetupType::Live, "live.example.com", ORIGIN)
            .with_token_chain(Some(chain(false, SignatureAlgorithm::Ed25519)));
        let service = build_service(&profile);

        for description in ["Live Child Playlist", "Live Media Chunks"] {
            let policy = rule(&service, description).cdn_policy().unwrap();
            assert!(policy.signed_request_keyset.as_deref().unwrap().ends_with("/long"));
            let opts = policy.signed_token_options.as_ref().unwrap();
            assert_eq!(opts.token_query_parameter.as_deref(), Some("hdntl"));
            assert_eq!(opts.allowed_signature_algorithms, vec![SignatureAlgorithm::Ed25519]);
        }
        let segment = rule(&service, "Live Media Chunks").cdn_policy().unwrap();
        assert!(segment.add_signatures.is_none());

        let dash = rule(&service, "Live DASH Manifest").cdn_policy().unwrap();
        assert_eq!(dash.signed_request_mode, Some(SignedRequestMode::Disabled));
        assert!(dash.signed_token_options.is_none());
    }

    #[test]
    fn ssl_certificate_is_attached_when_given() {
        let profile = DeliveryProfile::new(SetupType::Vod, "cdn.example.com", ORIGIN)
            .with_ssl_certificate(Some("projects/p/locations/global/certificates/cdn".into()));
        let service = build_service(&profile);
        assert_eq!(
            service.edge_ssl_certificates,
            Some(vec!["projects/p/locations/global/certificates/cdn".to_string()])
        );

        let blank = DeliveryProfile::new(SetupType::Vod, "cdn.example.com", ORIGIN)
            .with_ssl_certificate(Some(String::new()));
        assert!(build_service(&blank).edge_ssl_certificates.is_none());
    }
}
