use crate::{Error, Result};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::Deserialize;
use std::borrow::Cow;

/// Standard alphabet, accepting payloads with or without `=` padding.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// The byte representations a caller can hand to the detector.
///
/// JSON form: `{"kind": "blob" | "array" | "base64", "data": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ByteSource {
    /// In-memory binary blob, e.g. file contents read off disk.
    Blob(Vec<u8>),
    /// Untyped numeric array as sent by JSON clients. Every element must fit in a byte.
    Array(Vec<u32>),
    /// Base64 payload, optionally wrapped in a `data:` URL.
    Base64(String),
}

impl ByteSource {
    /// Up to `limit` leading bytes of the source.
    pub fn sniff_prefix(&self, limit: usize) -> Result<Cow<'_, [u8]>> {
        match self {
            ByteSource::Blob(bytes) => Ok(Cow::Borrowed(&bytes[..bytes.len().min(limit)])),
            ByteSource::Array(values) => {
                Ok(Cow::Owned(array_to_bytes(values.iter().take(limit))?))
            }
            ByteSource::Base64(encoded) => {
                let payload = base64_payload(encoded)?.as_bytes();
                // Whole 4-character groups covering `limit` bytes.
                let needed = limit.div_ceil(3) * 4;
                let mut bytes = decode_base64(&payload[..payload.len().min(needed)])?;
                bytes.truncate(limit);
                Ok(Cow::Owned(bytes))
            }
        }
    }

    /// Materialize the whole source.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            ByteSource::Blob(bytes) => Ok(bytes),
            ByteSource::Array(values) => array_to_bytes(values.iter()),
            ByteSource::Base64(encoded) => decode_base64(base64_payload(&encoded)?.as_bytes()),
        }
    }
}

impl From<Vec<u8>> for ByteSource {
    fn from(bytes: Vec<u8>) -> Self {
        ByteSource::Blob(bytes)
    }
}

impl From<&[u8]> for ByteSource {
    fn from(bytes: &[u8]) -> Self {
        ByteSource::Blob(bytes.to_vec())
    }
}

fn array_to_bytes<'a>(values: impl Iterator<Item = &'a u32>) -> Result<Vec<u8>> {
    values
        .enumerate()
        .map(|(index, &value)| {
            u8::try_from(value).map_err(|_| {
                Error::UnsupportedSource(format!(
                    "array element {} at index {} is not a byte",
                    value, index
                ))
            })
        })
        .collect()
}

/// The encoded data, with any `data:` URL header stripped.
fn base64_payload(encoded: &str) -> Result<&str> {
    let payload = match encoded.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(";base64,")
            .map(|(_, data)| data)
            .ok_or_else(|| {
                Error::UnsupportedSource("data URL is not base64-encoded".to_string())
            })?,
        None => encoded,
    };

    Ok(payload.trim())
}

fn decode_base64(payload: &[u8]) -> Result<Vec<u8>> {
    BASE64
        .decode(payload)
        .map_err(|e| Error::UnsupportedSource(format!("invalid base64 payload: {}", e)))
}
