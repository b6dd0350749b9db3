use crate::ServiceConfig;

/// Fields the provider assigns; they must not be sent back on create or patch.
pub const SERVER_FIELDS: [&str; 6] = [
    "updateTime",
    "createTime",
    "etag",
    "ipv4Addresses",
    "ipv6Addresses",
    "name",
];

pub fn strip_server_fields(config: &mut ServiceConfig) {
    config.update_time = None;
    config.create_time = None;
    config.etag = None;
    config.ipv4_addresses = None;
    config.ipv6_addresses = None;
    config.name = None;
}

/// Re-target a fetched service at a new domain and origin.
///
/// Rules, headers and cache settings are preserved. In the first path
/// matcher the origin is forced onto rule index 0 and onto any rule whose
/// priority is exactly `"1"`; other rules keep their origins.
pub fn clone_service(
    mut source: ServiceConfig,
    domain: &str,
    origin: &str,
    ssl_certificate: Option<&str>,
) -> ServiceConfig {
    strip_server_fields(&mut source);

    source.edge_ssl_certificates = ssl_certificate
        .map(str::trim)
        .filter(|cert| !cert.is_empty())
        .map(|cert| vec![cert.to_string()]);

    if let Some(routing) = source.routing.as_mut() {
        for host_rule in &mut routing.host_rules {
            host_rule.hosts = vec![domain.to_string()];
        }

        if let Some(matcher) = routing.path_matchers.first_mut() {
            for (index, rule) in matcher.route_rules.iter_mut().enumerate() {
                if index == 0 || rule.priority == "1" {
                    rule.origin = Some(origin.to_string());
                }
            }
        }
    }

    source
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn fetched() -> Value {
        json!({
            "name": "projects/p/locations/global/edgeCacheServices/prod",
            "createTime": "2025-01-01T00:00:00Z",
            "updateTime": "2025-02-01T00:00:00Z",
            "etag": "abc",
            "ipv4Addresses": ["34.1.2.3"],
            "ipv6Addresses": ["2600::1"],
            "description": "production",
            "labels": { "team": "video" },
            "edgeSslCertificates": ["projects/p/locations/global/certificates/old"],
            "routing": {
                "hostRules": [
                    { "hosts": ["a.example.com", "b.example.com"], "pathMatcher": "m0" },
                    { "hosts": ["c.example.com"], "pathMatcher": "m1" }
                ],
                "pathMatchers": [
                    {
                        "name": "m0",
                        "routeRules": [
                            { "priority": "10", "origin": "old-a", "matchRules": [] },
                            { "priority": "1", "origin": "old-b", "matchRules": [] },
                            { "priority": "2", "origin": "old-c", "matchRules": [] }
                        ]
                    },
                    {
                        "name": "m1",
                        "routeRules": [
                            { "priority": "1", "origin": "old-d", "matchRules": [] }
                        ]
                    }
                ]
            }
        })
    }

    #[test]
    fn strips_exactly_server_assigned_fields() {
        let mut config = ServiceConfig::from_value(fetched()).unwrap();
        strip_server_fields(&mut config);
        let json = config.to_value().unwrap();

        for field in SERVER_FIELDS {
            assert!(json.get(field).is_none(), "{field} should be stripped");
        }
        assert_eq!(json["description"], "production");
        assert_eq!(json["labels"]["team"], "video");
        assert!(json.get("routing").is_some());
        assert!(json.get("edgeSslCertificates").is_some());
    }

    #[test]
    fn clone_rewrites_hosts_and_forces_origin_on_first_matcher() {
        let source = ServiceConfig::from_value(fetched()).unwrap();
        let cloned = clone_service(source, "new.example.com", "new-origin", None);
        let json = cloned.to_value().unwrap();

        for rule in json["routing"]["hostRules"].as_array().unwrap() {
            assert_eq!(rule["hosts"], json!(["new.example.com"]));
        }

        let first = &json["routing"]["pathMatchers"][0]["routeRules"];
        assert_eq!(first[0]["origin"], "new-origin");
        assert_eq!(first[1]["origin"], "new-origin");
        assert_eq!(first[2]["origin"], "old-c");
        assert_eq!(json["routing"]["pathMatchers"][1]["routeRules"][0]["origin"], "old-d");

        assert!(json.get("edgeSslCertificates").is_none());
        assert!(json.get("etag").is_none());
    }

    #[test]
    fn clone_replaces_certificate_when_given() {
        let source = ServiceConfig::from_value(fetched()).unwrap();
        let cloned = clone_service(source, "new.example.com", "o", Some("projects/p/certs/new"));
        assert_eq!(
            cloned.edge_ssl_certificates,
            Some(vec!["projects/p/certs/new".to_string()])
        );
    }

    #[test]
    fn clone_without_routing_is_left_alone() {
        let source = ServiceConfig::from_value(json!({ "description": "bare" })).unwrap();
        let cloned = clone_service(source, "x.example.com", "o", None);
        assert!(cloned.routing.is_none());
        assert_eq!(cloned.description.as_deref(), Some("bare"));
    }

    proptest! {
        #[test]
        fn every_host_rule_points_at_new_domain(
            domain in "[a-z]{1,12}\\.example\\.com",
            hosts in proptest::collection::vec(
                proptest::collection::vec("[a-z]{1,8}\\.test", 0..4),
                0..6,
            ),
        ) {
            let host_rules: Vec<Value> = hosts
                .iter()
                .map(|h| json!({ "hosts": h, "pathMatcher": "m" }))
                .collect();
            let source = ServiceConfig::from_value(json!({
                "name": "n",
                "routing": { "hostRules": host_rules, "pathMatchers": [] }
            }))
            .unwrap();

            let cloned = clone_service(source, &domain, "o", None);
            prop_assert!(cloned.name.is_none());
            prop_assert_eq!(cloned.host_rules().len(), hosts.len());
            for rule in cloned.host_rules() {
                prop_assert_eq!(&rule.hosts, &vec![domain.clone()]);
            }
        }
    }
}
