use super::UploadService;
use crate::models::{SignedUpload, SignedUrlRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use std::time::Duration;

pub struct ApiUploadClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl ApiUploadClient {
    pub fn new(base_url: String, api_token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self::new_with_client(base_url, api_token, client))
    }

    pub fn new_with_client(base_url: String, api_token: Option<String>, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        }
    }

    fn signed_url_endpoint(&self) -> String {
        format!("{}/uploads/signed-url", self.base_url)
    }

    async fn ensure_success(response: Response, action: &str) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        tracing::error!("{} failed (status {}): {}", action, status, error_text);
        Err(Error::Api(format!(
            "{} failed (status {}): {}",
            action, status, error_text
        )))
    }
}

#[async_trait]
impl UploadService for ApiUploadClient {
    async fn request_signed_url(&self, request: &SignedUrlRequest) -> Result<SignedUpload> {
        tracing::debug!(
            "Requesting signed upload URL for {} ({})",
            request.file_name,
            request.content_type
        );

        let mut builder = self.client.post(self.signed_url_endpoint()).json(request);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Failed to send signed URL request: {}", e);
            e
        })?;
        let response = Self::ensure_success(response, "Signed URL request").await?;
        let body = response.text().await?;

        Ok(serde_json::from_str(&body)?)
    }

    async fn put_object(&self, upload_url: &str, data: &[u8], content_type: &str) -> Result<()> {
        tracing::debug!("Uploading {} bytes ({})", data.len(), content_type);

        let response = self
            .client
            .put(upload_url)
            .header(CONTENT_TYPE, content_type)
            .body(data.to_vec())
            .send()
            .await?;
        Self::ensure_success(response, "Upload").await?;

        Ok(())
    }
}
