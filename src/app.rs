//! Upload orchestration: detect the image type, then publish the bytes.

use crate::mime::{self, ByteSource};
use crate::models::{Config, SignedUrlRequest, UploadedImage};
use crate::upload::{ApiUploadClient, UploadService};
use crate::{Error, Result};
use std::path::Path;
use std::time::Duration;
use tokio_retry::{strategy::FixedInterval, Retry};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Gates uploads on image type detection and sends accepted images to the
/// admin backend.
pub struct ImageUploader {
    upload: Box<dyn UploadService>,
    retry_attempts: usize,
    retry_interval: Duration,
}

impl ImageUploader {
    pub fn with_service(
        upload: Box<dyn UploadService>,
        retry_attempts: usize,
        retry_interval: Duration,
    ) -> Self {
        Self {
            upload,
            retry_attempts,
            retry_interval,
        }
    }

    /// Construct an uploader talking to the API named in `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = ApiUploadClient::new(
            config.api_base_url.clone(),
            config.api_token.clone(),
            Duration::from_secs(config.http_timeout_secs),
        )?;

        Ok(Self::with_service(
            Box::new(client),
            config.retry_attempts,
            Duration::from_millis(config.retry_interval_ms),
        ))
    }

    /// Upload `source`. Fails with [`Error::UndetectedType`] before any
    /// backend call when the image type cannot be determined.
    pub async fn upload(&self, source: ByteSource, filename: Option<&str>) -> Result<UploadedImage> {
        let content_type = mime::detect(&source, filename).ok_or_else(|| {
            warn!("Refusing upload of {:?}: unknown image type", filename);
            Error::UndetectedType {
                filename: filename.map(str::to_string),
            }
        })?;
        let data = source.into_bytes()?;

        let request = SignedUrlRequest {
            file_name: format!("{}.{}", Uuid::new_v4(), content_type.extension()),
            content_type,
        };
        let signed = self.upload.request_signed_url(&request).await?;
        info!("Obtained signed upload URL for {}", signed.key);

        self.put_with_retry(&signed.upload_url, &data, content_type.as_str())
            .await?;
        info!(
            "Uploaded {} ({} bytes, {}) to {}",
            signed.key,
            data.len(),
            content_type,
            signed.public_url
        );

        Ok(UploadedImage {
            key: signed.key,
            public_url: signed.public_url,
            content_type,
            size: data.len(),
        })
    }

    /// Read `path` from disk and upload it under its own file name.
    pub async fn upload_path(&self, path: &Path) -> Result<UploadedImage> {
        let data = tokio::fs::read(path).await?;
        let filename = path.file_name().and_then(|name| name.to_str());
        self.upload(ByteSource::Blob(data), filename).await
    }

    async fn put_with_retry(&self, upload_url: &str, data: &[u8], content_type: &str) -> Result<()> {
        let retry_strategy =
            FixedInterval::new(self.retry_interval).take(self.retry_attempts.saturating_sub(1));

        Retry::spawn(retry_strategy, move || async move {
            self.upload
                .put_object(upload_url, data, content_type)
                .await
                .map_err(|e| {
                    warn!("Upload attempt failed: {}. Will retry...", e);
                    e
                })
        })
        .await
        .map_err(|e| {
            error!("Upload failed after {} attempts: {}", self.retry_attempts, e);
            e
        })
    }
}
