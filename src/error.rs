//! Error handling and custom error types
//!
//! Provides unified error handling across the crate using thiserror.
//! Note that an undetected image type is not an error for the detector
//! itself; it only becomes one when an upload is refused because of it.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unsupported byte source: {0}")]
    UnsupportedSource(String),

    #[error("Could not determine file type{}", file_suffix(.filename))]
    UndetectedType { filename: Option<String> },

    #[error("Upload API error: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

fn file_suffix(filename: &Option<String>) -> String {
    filename
        .as_deref()
        .map(|name| format!(" of '{}'", name))
        .unwrap_or_default()
}
