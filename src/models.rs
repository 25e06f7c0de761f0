//! Data models and structures
//!
//! Defines the upload API payloads and the runtime configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mime::ImageMime;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignedUrlRequest {
    pub file_name: String,
    pub content_type: ImageMime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignedUpload {
    pub upload_url: String,
    pub public_url: String,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Outcome of a successful upload.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UploadedImage {
    pub key: String,
    pub public_url: String,
    pub content_type: ImageMime,
    pub size: usize,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub retry_attempts: usize,
    pub retry_interval_ms: u64,
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse = |key: &str, default: u64| -> crate::Result<u64> {
            match lookup(key) {
                Some(value) => value.trim().parse().map_err(|_| {
                    crate::Error::Config(format!("{} must be a number, got '{}'", key, value))
                }),
                None => Ok(default),
            }
        };

        let api_base_url = lookup("API_BASE_URL")
            .ok_or_else(|| crate::Error::Config("API_BASE_URL not set".to_string()))?
            .trim_end_matches('/')
            .to_string();

        let retry_attempts = parse("UPLOAD_RETRY_ATTEMPTS", 3)? as usize;
        if retry_attempts == 0 {
            return Err(crate::Error::Config(
                "UPLOAD_RETRY_ATTEMPTS must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            api_base_url,
            api_token: lookup("API_TOKEN").filter(|token| !token.is_empty()),
            retry_attempts,
            retry_interval_ms: parse("UPLOAD_RETRY_INTERVAL_MS", 500)?,
            http_timeout_secs: parse("HTTP_TIMEOUT_SECS", 30)?,
        })
    }
}
