//! Provider control-plane access: Network Services (edge cache origins,
//! services and keysets), Certificate Manager, Secret Manager, Cloud
//! Storage IAM and project metadata.

mod error;
mod http;

pub use error::CloudError;
pub use http::{Endpoints, HttpCloudClient};

use async_trait::async_trait;
use edge_queue::OperationSource;
use serde_json::Value;

use crate::iam::IamPolicy;

/// Update mask used whenever an existing service is patched.
pub const SERVICE_UPDATE_MASK: &str = "routing,logConfig,edgeSslCertificates,description";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Origins,
    Services,
    Keysets,
    Certificates,
    Secrets,
}

impl ResourceKind {
    /// Collection segment in the resource path.
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::Origins => "edgeCacheOrigins",
            ResourceKind::Services => "edgeCacheServices",
            ResourceKind::Keysets => "edgeCacheKeysets",
            ResourceKind::Certificates => "certificates",
            ResourceKind::Secrets => "secrets",
        }
    }
}

pub type CloudResult<T> = Result<T, CloudError>;

/// Everything the deployer asks of the provider.
///
/// Mutating calls return the raw long-running operation document; the
/// operation itself is observed through [`OperationSource`].
#[async_trait]
pub trait CloudApi: OperationSource {
    fn project_id(&self) -> &str;

    /// Obtain (or refresh) credentials so that auth problems surface
    /// before any resource is touched.
    async fn authenticate(&self) -> CloudResult<()>;

    async fn project_number(&self) -> CloudResult<String>;

    async fn create_origin(&self, origin_id: &str, body: &Value) -> CloudResult<Value>;

    async fn create_service(&self, service_id: &str, body: &Value) -> CloudResult<Value>;

    async fn get_service(&self, service_id: &str) -> CloudResult<Value>;

    async fn patch_service(
        &self,
        service_id: &str,
        body: &Value,
        update_mask: &str,
    ) -> CloudResult<Value>;

    async fn list_resources(&self, kind: ResourceKind) -> CloudResult<Value>;

    async fn get_resource(&self, kind: ResourceKind, id: &str) -> CloudResult<Value>;

    async fn delete_resource(&self, kind: ResourceKind, id: &str) -> CloudResult<Value>;

    /// `{"buckets": [{"name": ...}]}` for the credential's project.
    async fn list_buckets(&self) -> CloudResult<Value>;

    async fn generate_service_identity(&self, service: &str) -> CloudResult<Value>;

    async fn get_bucket_iam(&self, bucket: &str) -> CloudResult<IamPolicy>;

    async fn set_bucket_iam(&self, bucket: &str, policy: &IamPolicy) -> CloudResult<IamPolicy>;
}

/// Name of the long-running operation returned by a mutating call.
pub fn operation_name(response: &Value) -> CloudResult<String> {
    response
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CloudError::Decode(format!("operation name missing in {response}")))
}
