use super::UploadService;
use crate::models::{SignedUpload, SignedUrlRequest};
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockUploadClient {
    objects: Arc<Mutex<HashMap<String, (Vec<u8>, String)>>>,
    base_url: String,
    signed_url_count: Arc<Mutex<usize>>,
    put_count: Arc<Mutex<usize>>,
    put_failures: Arc<Mutex<usize>>,
}

impl MockUploadClient {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            base_url: "https://mock-cdn.example.com".to_string(),
            signed_url_count: Arc::new(Mutex::new(0)),
            put_count: Arc::new(Mutex::new(0)),
            put_failures: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Fail the next `failures` object uploads.
    pub fn with_put_failures(self, failures: usize) -> Self {
        *self.put_failures.lock().unwrap() = failures;
        self
    }

    pub fn get_signed_url_count(&self) -> usize {
        *self.signed_url_count.lock().unwrap()
    }

    pub fn get_put_count(&self) -> usize {
        *self.put_count.lock().unwrap()
    }

    /// Uploaded objects keyed by upload URL, with their content type.
    pub fn get_objects(&self) -> HashMap<String, (Vec<u8>, String)> {
        self.objects.lock().unwrap().clone()
    }
}

impl Default for MockUploadClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UploadService for MockUploadClient {
    async fn request_signed_url(&self, request: &SignedUrlRequest) -> Result<SignedUpload> {
        *self.signed_url_count.lock().unwrap() += 1;

        let key = format!("blog/{}", request.file_name);
        Ok(SignedUpload {
            upload_url: format!("{}/upload/{}?signature=mock", self.base_url, key),
            public_url: format!("{}/{}", self.base_url, key),
            key,
            expires_at: None,
        })
    }

    async fn put_object(&self, upload_url: &str, data: &[u8], content_type: &str) -> Result<()> {
        *self.put_count.lock().unwrap() += 1;

        {
            let mut failures = self.put_failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(crate::Error::Api("Mock upload failure".to_string()));
            }
        }

        self.objects.lock().unwrap().insert(
            upload_url.to_string(),
            (data.to_vec(), content_type.to_string()),
        );
        Ok(())
    }
}
