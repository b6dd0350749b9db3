use std::sync::Arc;

use async_trait::async_trait;
use edge_auth::TokenSource;
use edge_queue::{OperationSource, OperationStatus};
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};
use tokio::sync::OnceCell;

use super::{CloudApi, CloudError, CloudResult, ResourceKind};
use crate::iam::IamPolicy;

/// Base URLs of the control-plane APIs. Overridable for tests.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub network_services: String,
    pub certificate_manager: String,
    pub secret_manager: String,
    pub storage: String,
    pub resource_manager: String,
    pub service_usage: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            network_services: "https://networkservices.googleapis.com/v1alpha1".into(),
            certificate_manager: "https://certificatemanager.googleapis.com/v1".into(),
            secret_manager: "https://secretmanager.googleapis.com/v1".into(),
            storage: "https://storage.googleapis.com/storage/v1".into(),
            resource_manager: "https://cloudresourcemanager.googleapis.com/v1".into(),
            service_usage: "https://serviceusage.googleapis.com/v1".into(),
        }
    }
}

impl Endpoints {
    /// Point every API at one base URL (a local mock server).
    pub fn single(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            network_services: base.clone(),
            certificate_manager: base.clone(),
            secret_manager: base.clone(),
            storage: base.clone(),
            resource_manager: base.clone(),
            service_usage: base,
        }
    }
}

/// [`CloudApi`] over the provider's REST endpoints.
pub struct HttpCloudClient {
    http: Client,
    tokens: Arc<dyn TokenSource>,
    project_id: String,
    endpoints: Endpoints,
    project_number: OnceCell<String>,
}

impl HttpCloudClient {
    pub fn new(http: Client, tokens: Arc<dyn TokenSource>, project_id: impl Into<String>) -> Self {
        Self {
            http,
            tokens,
            project_id: project_id.into(),
            endpoints: Endpoints::default(),
            project_number: OnceCell::new(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    fn collection_url(&self, kind: ResourceKind) -> String {
        let project = urlencoding::encode(&self.project_id);
        match kind {
            ResourceKind::Origins | ResourceKind::Services | ResourceKind::Keysets => format!(
                "{}/projects/{project}/locations/global/{}",
                self.endpoints.network_services,
                kind.collection()
            ),
            ResourceKind::Certificates => format!(
                "{}/projects/{project}/locations/global/certificates",
                self.endpoints.certificate_manager
            ),
            ResourceKind::Secrets => {
                format!("{}/projects/{project}/secrets", self.endpoints.secret_manager)
            }
        }
    }

    fn resource_url(&self, kind: ResourceKind, id: &str) -> String {
        format!("{}/{}", self.collection_url(kind), urlencoding::encode(id))
    }

    fn bucket_iam_url(&self, bucket: &str) -> String {
        format!("{}/b/{}/iam", self.endpoints.storage, urlencoding::encode(bucket))
    }

    #[tracing::instrument(skip(self, body), fields(project = %self.project_id))]
    async fn request(&self, method: Method, url: &str, body: Option<&Value>) -> CloudResult<Value> {
        let token = self.tokens.access_token().await?;
        let mut request = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        match status {
            s if s.is_success() => {
                if text.trim().is_empty() {
                    return Ok(json!({}));
                }
                serde_json::from_str(&text).map_err(|err| CloudError::Decode(err.to_string()))
            }
            StatusCode::CONFLICT => Err(CloudError::Conflict),
            StatusCode::NOT_FOUND => Err(CloudError::NotFound(text)),
            _ => {
                tracing::warn!(status = status.as_u16(), url, "provider request failed");
                Err(CloudError::Api {
                    status: status.as_u16(),
                    body: text,
                })
            }
        }
    }
}

#[async_trait]
impl OperationSource for HttpCloudClient {
    async fn operation(&self, name: &str) -> anyhow::Result<OperationStatus> {
        let url = format!("{}/{}", self.endpoints.network_services, name);
        let raw = self.request(Method::GET, &url, None).await?;
        Ok(serde_json::from_value(raw)?)
    }
}

#[async_trait]
impl CloudApi for HttpCloudClient {
    fn project_id(&self) -> &str {
        &self.project_id
    }

    async fn authenticate(&self) -> CloudResult<()> {
        self.tokens.access_token().await?;
        Ok(())
    }

    async fn project_number(&self) -> CloudResult<String> {
        self.project_number
            .get_or_try_init(|| async {
                let url = format!(
                    "{}/projects/{}",
                    self.endpoints.resource_manager,
                    urlencoding::encode(&self.project_id)
                );
                let project = self.request(Method::GET, &url, None).await?;
                match &project["projectNumber"] {
                    Value::String(number) => Ok(number.clone()),
                    Value::Number(number) => Ok(number.to_string()),
                    _ => Err(CloudError::Decode("projectNumber missing".into())),
                }
            })
            .await
            .cloned()
    }

    async fn create_origin(&self, origin_id: &str, body: &Value) -> CloudResult<Value> {
        let url = format!(
            "{}?edgeCacheOriginId={}",
            self.collection_url(ResourceKind::Origins),
            urlencoding::encode(origin_id)
        );
        self.request(Method::POST, &url, Some(body)).await
    }

    async fn create_service(&self, service_id: &str, body: &Value) -> CloudResult<Value> {
        let url = format!(
            "{}?edgeCacheServiceId={}",
            self.collection_url(ResourceKind::Services),
            urlencoding::encode(service_id)
        );
        self.request(Method::POST, &url, Some(body)).await
    }

    async fn get_service(&self, service_id: &str) -> CloudResult<Value> {
        self.get_resource(ResourceKind::Services, service_id).await
    }

    async fn patch_service(
        &self,
        service_id: &str,
        body: &Value,
        update_mask: &str,
    ) -> CloudResult<Value> {
        let url = format!(
            "{}?updateMask={}",
            self.resource_url(ResourceKind::Services, service_id),
            urlencoding::encode(update_mask)
        );
        self.request(Method::PATCH, &url, Some(body)).await
    }

    async fn list_resources(&self, kind: ResourceKind) -> CloudResult<Value> {
        self.request(Method::GET, &self.collection_url(kind), None).await
    }

    async fn get_resource(&self, kind: ResourceKind, id: &str) -> CloudResult<Value> {
        self.request(Method::GET, &self.resource_url(kind, id), None).await
    }

    async fn delete_resource(&self, kind: ResourceKind, id: &str) -> CloudResult<Value> {
        self.request(Method::DELETE, &self.resource_url(kind, id), None).await
    }

    async fn list_buckets(&self) -> CloudResult<Value> {
        let url = format!(
            "{}/b?project={}",
            self.endpoints.storage,
            urlencoding::encode(&self.project_id)
        );
        let listing = self.request(Method::GET, &url, None).await?;
        let buckets: Vec<Value> = listing["items"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item["name"].as_str())
                    .map(|name| json!({ "name": name }))
                    .collect()
            })
            .unwrap_or_default();
        Ok(json!({ "buckets": buckets }))
    }

    async fn generate_service_identity(&self, service: &str) -> CloudResult<Value> {
        let url = format!(
            "{}/projects/{}/services/{}:generateServiceIdentity",
            self.endpoints.service_usage,
            urlencoding::encode(&self.project_id),
            service
        );
        self.request(Method::POST, &url, Some(&json!({}))).await
    }

    async fn get_bucket_iam(&self, bucket: &str) -> CloudResult<IamPolicy> {
        let raw = self.request(Method::GET, &self.bucket_iam_url(bucket), None).await?;
        serde_json::from_value(raw).map_err(|err| CloudError::Decode(err.to_string()))
    }

    async fn set_bucket_iam(&self, bucket: &str, policy: &IamPolicy) -> CloudResult<IamPolicy> {
        let body = serde_json::to_value(policy).map_err(|err| CloudError::Decode(err.to_string()))?;
        let raw = self
            .request(Method::PUT, &self.bucket_iam_url(bucket), Some(&body))
            .await?;
        serde_json::from_value(raw).map_err(|err| CloudError::Decode(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edge_auth::StaticTokenSource;

    fn client() -> HttpCloudClient {
        HttpCloudClient::new(
            Client::new(),
            Arc::new(StaticTokenSource("token".into())),
            "demo-project",
        )
    }

    #[test]
    fn network_services_urls() {
        let c = client();
        assert_eq!(
            c.resource_url(ResourceKind::Services, "vod-svc"),
            "https://networkservices.googleapis.com/v1alpha1/projects/demo-project/locations/global/edgeCacheServices/vod-svc"
        );
        assert_eq!(
            c.collection_url(ResourceKind::Keysets),
            "https://networkservices.googleapis.com/v1alpha1/projects/demo-project/locations/global/edgeCacheKeysets"
        );
    }

    #[test]
    fn certificate_and_secret_urls() {
        let c = client();
        assert_eq!(
            c.collection_url(ResourceKind::Certificates),
            "https://certificatemanager.googleapis.com/v1/projects/demo-project/locations/global/certificates"
        );
        assert_eq!(
            c.collection_url(ResourceKind::Secrets),
            "https://secretmanager.googleapis.com/v1/projects/demo-project/secrets"
        );
    }

    #[test]
    fn endpoints_can_share_one_base() {
        let c = client().with_endpoints(Endpoints::single("http://127.0.0.1:9000/"));
        assert_eq!(
            c.bucket_iam_url("media"),
            "http://127.0.0.1:9000/b/media/iam"
        );
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let c = client().with_endpoints(Endpoints::single("http://127.0.0.1:1"));
        let err = c.get_service("svc").await.unwrap_err();
        assert!(matches!(err, CloudError::Network(_)));
    }
}
