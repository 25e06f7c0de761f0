//! Admin API integration for image uploads
//!
//! Requests a signed upload URL from the admin backend and transfers the
//! raw file bytes to it.

pub mod client;
pub mod mock;

pub use client::ApiUploadClient;
pub use mock::MockUploadClient;

use crate::models::{SignedUpload, SignedUrlRequest};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait UploadService: Send + Sync {
    async fn request_signed_url(&self, request: &SignedUrlRequest) -> Result<SignedUpload>;
    async fn put_object(&self, upload_url: &str, data: &[u8], content_type: &str) -> Result<()>;
}
