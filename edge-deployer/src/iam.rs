//! Bucket IAM for the edge fill service account: who needs access, which
//! roles count as access, and how a grant is merged into a policy.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Service agents that must exist before their account can be granted.
pub const SERVICE_IDENTITIES: [&str; 2] = [
    "mediaedgefill.googleapis.com",
    "mediaedge.googleapis.com",
];

/// Roles written by a grant.
pub const GRANT_ROLES: [&str; 2] = [
    "roles/storage.objectViewer",
    "roles/storage.legacyBucketReader",
];

/// Roles accepted as read access by a check.
pub const CHECK_ROLES: [&str; 6] = [
    "roles/storage.objectViewer",
    "roles/storage.legacyBucketReader",
    "roles/storage.admin",
    "roles/viewer",
    "roles/editor",
    "roles/owner",
];

/// The account the edge cache uses to pull from storage origins.
pub fn fill_service_account(project_number: &str) -> String {
    format!("service-{project_number}@gcp-sa-mediaedgefill.iam.gserviceaccount.com")
}

pub fn member(service_account: &str) -> String {
    format!("serviceAccount:{service_account}")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IamPolicy {
    #[serde(default)]
    pub bindings: Vec<Binding>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub role: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IamPolicy {
    /// True if any account holds any of `roles`.
    pub fn grants_any(&self, service_accounts: &[String], roles: &[&str]) -> bool {
        self.bindings
            .iter()
            .filter(|binding| roles.contains(&binding.role.as_str()))
            .any(|binding| {
                service_accounts
                    .iter()
                    .any(|sa| binding.members.contains(&member(sa)))
            })
    }

    /// Add every account to every role. The first binding for a role is
    /// extended; a missing role gets a new binding. Other bindings and
    /// policy fields (etag, version) are left alone.
    pub fn grant(&mut self, service_accounts: &[String], roles: &[&str]) {
        for role in roles {
            match self.bindings.iter_mut().find(|b| b.role == *role) {
                Some(binding) => {
                    for sa in service_accounts {
                        let m = member(sa);
                        if !binding.members.contains(&m) {
                            binding.members.push(m);
                        }
                    }
                }
                None => self.bindings.push(Binding {
                    role: role.to_string(),
                    members: service_accounts.iter().map(|sa| member(sa)).collect(),
                    extra: Map::new(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn accounts() -> Vec<String> {
        vec![fill_service_account("123456")]
    }

    #[test]
    fn fill_account_format() {
        assert_eq!(
            fill_service_account("42"),
            "service-42@gcp-sa-mediaedgefill.iam.gserviceaccount.com"
        );
    }

    #[test]
    fn check_accepts_broader_roles() {
        let policy: IamPolicy = serde_json::from_value(json!({
            "bindings": [{
                "role": "roles/editor",
                "members": ["serviceAccount:service-123456@gcp-sa-mediaedgefill.iam.gserviceaccount.com"]
            }]
        }))
        .unwrap();
        assert!(policy.grants_any(&accounts(), &CHECK_ROLES));
        assert!(!policy.grants_any(&accounts(), &GRANT_ROLES));
    }

    #[test]
    fn grant_merges_without_duplicates() {
        let mut policy: IamPolicy = serde_json::from_value(json!({
            "etag": "CAE=",
            "bindings": [
                {"role": "roles/storage.objectViewer", "members": ["user:a@example.com"]},
                {"role": "roles/storage.admin", "members": ["user:b@example.com"]}
            ]
        }))
        .unwrap();

        policy.grant(&accounts(), &GRANT_ROLES);
        policy.grant(&accounts(), &GRANT_ROLES);

        let sa = member(&accounts()[0]);
        assert_eq!(policy.bindings.len(), 3);
        assert_eq!(
            policy.bindings[0].members,
            vec!["user:a@example.com".to_string(), sa.clone()]
        );
        assert_eq!(policy.bindings[1].members, vec!["user:b@example.com".to_string()]);
        assert_eq!(policy.bindings[2].role, "roles/storage.legacyBucketReader");
        assert_eq!(policy.bindings[2].members, vec![sa]);

        let raw = serde_json::to_value(&policy).unwrap();
        assert_eq!(raw["etag"], "CAE=");
        assert!(policy.grants_any(&accounts(), &GRANT_ROLES));
    }
}
