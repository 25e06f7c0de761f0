//! Image type detection and upload for the blog authoring console
//!
//! Uploaded images are classified by magic-byte signature (with a filename
//! extension fallback) before a signed upload URL is requested from the
//! admin API and the file is transferred to it.

pub mod app;
pub mod error;
pub mod mime;
pub mod models;
pub mod upload;

pub use error::{Error, Result};
pub use mime::{detect, detect_by_extension, detect_by_signature, ByteSource, ImageMime};
