use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use edge_auth::TokenSource;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::{BlobError, BlobResult, ObjectGeneration, ObjectStore, PutResult};

pub const DEFAULT_STORAGE_BASE: &str = "https://storage.googleapis.com";

/// Cloud Storage JSON API backend.
pub struct GcsStore {
    http: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
    project_id: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ObjectList {
    #[serde(default)]
    items: Vec<ObjectGeneration>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadedObject {
    generation: Option<String>,
}

impl GcsStore {
    pub fn new(
        http: reqwest::Client,
        tokens: Arc<dyn TokenSource>,
        project_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            tokens,
            project_id: project_id.into(),
            base_url: DEFAULT_STORAGE_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn bucket_url(&self, bucket: &str) -> String {
        format!(
            "{}/storage/v1/b/{}",
            self.base_url,
            urlencoding::encode(bucket)
        )
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/o/{}", self.bucket_url(bucket), urlencoding::encode(key))
    }

    fn upload_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.base_url,
            urlencoding::encode(bucket),
            urlencoding::encode(key)
        )
    }

    async fn send(&self, request: RequestBuilder) -> BlobResult<Response> {
        let token = self.tokens.access_token().await?;
        Ok(request.bearer_auth(token).send().await?)
    }
}

async fn http_error(response: Response) -> BlobError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    BlobError::Http { status, body }
}

#[async_trait]
impl ObjectStore for GcsStore {
    #[tracing::instrument(skip(self))]
    async fn create_bucket(&self, bucket: &str, location: &str) -> BlobResult<()> {
        let url = format!(
            "{}/storage/v1/b?project={}",
            self.base_url,
            urlencoding::encode(&self.project_id)
        );
        let body = json!({
            "name": bucket,
            "location": location,
            "versioning": { "enabled": true },
        });

        let response = self.send(self.http.post(url).json(&body)).await?;
        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(BlobError::BucketExists {
                bucket: bucket.to_string(),
            }),
            _ => Err(http_error(response).await),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn enable_versioning(&self, bucket: &str) -> BlobResult<()> {
        let body = json!({ "versioning": { "enabled": true } });
        let response = self
            .send(self.http.patch(self.bucket_url(bucket)).json(&body))
            .await?;
        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(BlobError::BucketNotFound {
                bucket: bucket.to_string(),
            }),
            _ => Err(http_error(response).await),
        }
    }

    #[tracing::instrument(skip(self, body), fields(len = body.len()))]
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> BlobResult<PutResult> {
        let request = self
            .http
            .post(self.upload_url(bucket, key))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body);
        let response = self.send(request).await?;
        if !response.status().is_success() {
            return Err(http_error(response).await);
        }
        let uploaded: UploadedObject = response.json().await?;
        Ok(PutResult {
            generation: uploaded.generation,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn list_generations(
        &self,
        bucket: &str,
        key: &str,
    ) -> BlobResult<Vec<ObjectGeneration>> {
        let mut generations = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/o?versions=true&prefix={}",
                self.bucket_url(bucket),
                urlencoding::encode(key)
            );
            if let Some(token) = &page_token {
                url.push_str("&pageToken=");
                url.push_str(&urlencoding::encode(token));
            }

            let response = self.send(self.http.get(url)).await?;
            if response.status() == StatusCode::NOT_FOUND {
                return Err(BlobError::BucketNotFound {
                    bucket: bucket.to_string(),
                });
            }
            if !response.status().is_success() {
                return Err(http_error(response).await);
            }

            let page: ObjectList = response.json().await?;
            // prefix matching also returns e.g. "svc.json.bak"
            generations.extend(page.items.into_iter().filter(|item| item.name == key));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(generations)
    }

    #[tracing::instrument(skip(self))]
    async fn get_generation(&self, bucket: &str, key: &str, generation: &str) -> BlobResult<Bytes> {
        let url = format!(
            "{}?generation={}&alt=media",
            self.object_url(bucket, key),
            urlencoding::encode(generation)
        );
        let response = self.send(self.http.get(url)).await?;
        match response.status() {
            s if s.is_success() => Ok(response.bytes().await?),
            StatusCode::NOT_FOUND => Err(BlobError::NotFound {
                key: key.to_string(),
                generation: generation.to_string(),
            }),
            _ => Err(http_error(response).await),
        }
    }
}
