//! Image MIME type detection
//!
//! Classifies uploaded images by magic-byte signature first and falls back
//! to the filename extension. Detection never fails: anything that cannot
//! be classified (or even read) is reported as `None`.

pub mod extension;
pub mod signature;
pub mod source;
mod types;

pub use extension::detect_by_extension;
pub use signature::{
    detect_by_signature, matching_rules, SignatureRule, MIN_SIGNATURE_LEN, SIGNATURE_RULES,
    SVG_SCAN_LEN,
};
pub use source::ByteSource;
pub use types::ImageMime;

use std::path::Path;
use tokio::io::AsyncReadExt;

/// Detect the image type of `source`, consulting `filename` only when no
/// signature matches.
pub fn detect(source: &ByteSource, filename: Option<&str>) -> Option<ImageMime> {
    match source.sniff_prefix(SVG_SCAN_LEN) {
        Ok(prefix) => detect_bytes(&prefix, filename),
        Err(e) => {
            tracing::warn!("Could not read image bytes for type detection: {}", e);
            None
        }
    }
}

/// [`detect`] over a plain byte slice.
pub fn detect_bytes(bytes: &[u8], filename: Option<&str>) -> Option<ImageMime> {
    if let Some(mime) = detect_by_signature(bytes) {
        return Some(mime);
    }

    let mime = detect_by_extension(filename);
    if mime.is_some() {
        tracing::debug!(
            "No signature matched, using extension of {:?}",
            filename.unwrap_or_default()
        );
    }
    mime
}

/// Read the leading bytes of a file and detect its type, using its file
/// name for the extension fallback.
pub async fn detect_path(path: &Path) -> Option<ImageMime> {
    let bytes = match read_prefix(path, SVG_SCAN_LEN).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            return None;
        }
    };

    let filename = path.file_name().and_then(|name| name.to_str());
    detect_bytes(&bytes, filename)
}

async fn read_prefix(path: &Path, limit: usize) -> std::io::Result<Vec<u8>> {
    let file = tokio::fs::File::open(path).await?;
    let mut bytes = Vec::with_capacity(limit);
    file.take(limit as u64).read_to_end(&mut bytes).await?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    const PNG_HEADER: [u8; 16] = [
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52,
    ];

    #[test]
    fn test_signature_wins_over_extension() {
        let source = ByteSource::Blob(PNG_HEADER.to_vec());
        assert_eq!(detect(&source, Some("holiday.jpg")), Some(ImageMime::Png));
    }

    #[test]
    fn test_falls_back_to_extension() {
        let source = ByteSource::Blob(vec![0x00; 32]);
        assert_eq!(detect(&source, Some("photo.JPEG")), Some(ImageMime::Jpeg));
    }

    #[test]
    fn test_no_match_and_no_filename_is_undetected() {
        let source = ByteSource::Blob(vec![0x00; 32]);
        assert_eq!(detect(&source, None), None);
        assert_eq!(detect(&ByteSource::Blob(Vec::new()), None), None);
    }

    #[test]
    fn test_short_input_uses_extension() {
        let source = ByteSource::Blob(vec![0xFF, 0xD8, 0xFF]);
        assert_eq!(detect(&source, Some("tiny.gif")), Some(ImageMime::Gif));
        assert_eq!(detect(&source, None), None);
    }

    #[test]
    fn test_same_result_for_every_source_kind() {
        let gif = b"GIF87a\x01\x00\x01\x00\x80\x00\x00".to_vec();
        let sources = [
            ByteSource::Blob(gif.clone()),
            ByteSource::Array(gif.iter().map(|&b| u32::from(b)).collect()),
            ByteSource::Base64("R0lGODdhAQABAIAAAA==".to_string()),
        ];

        for source in &sources {
            assert_eq!(detect(source, None), Some(ImageMime::Gif), "{:?}", source);
        }
    }

    #[test]
    fn test_trailing_damage_is_ignored_for_every_source_kind() {
        use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
        use base64::Engine;

        let mut png = PNG_HEADER.to_vec();
        png.resize(300, 0xAB);

        let mut array: Vec<u32> = png.iter().map(|&b| u32::from(b)).collect();
        array.push(0x1FF);
        let mut encoded = STANDARD.encode(&png);
        encoded.push_str("!!");

        let sources = [
            ByteSource::Blob(png.clone()),
            ByteSource::Array(array),
            ByteSource::Base64(encoded),
            ByteSource::Base64(STANDARD_NO_PAD.encode(&png[..13])),
        ];

        for source in &sources {
            assert_eq!(detect(source, None), Some(ImageMime::Png), "{:?}", source);
        }
    }

    #[test]
    fn test_unreadable_source_is_undetected_without_fallback() {
        let source = ByteSource::Array(vec![0x1234; 16]);
        assert_eq!(detect(&source, Some("photo.png")), None);

        let source = ByteSource::Base64("%%%".to_string());
        assert_eq!(detect(&source, Some("photo.png")), None);
    }

    #[test]
    fn test_svg_detected_from_text() {
        let source = ByteSource::Blob(
            br#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 8 8"/>"#.to_vec(),
        );
        assert_eq!(detect(&source, Some("logo.png")), Some(ImageMime::Svg));
    }

    #[test]
    fn test_detection_is_idempotent() {
        let source = ByteSource::Blob(PNG_HEADER.to_vec());
        let first = detect(&source, Some("a.gif"));
        let second = detect(&source, Some("a.gif"));
        assert_eq!(first, second);

        let unknown = ByteSource::Blob(vec![0x01; 20]);
        assert_eq!(detect(&unknown, None), detect(&unknown, None));
    }

    #[tokio::test]
    async fn test_detect_path_reads_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("upload.bin");
        fs::write(&path, PNG_HEADER).unwrap();

        assert_eq!(detect_path(&path).await, Some(ImageMime::Png));
    }

    #[tokio::test]
    async fn test_detect_path_uses_file_name_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("diagram.webp");
        fs::write(&path, b"not really an image").unwrap();

        assert_eq!(detect_path(&path).await, Some(ImageMime::Webp));
    }

    #[tokio::test]
    async fn test_detect_path_reads_only_the_sniff_window() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("large.png");
        let mut data = PNG_HEADER.to_vec();
        data.resize(1 << 20, 0x00);
        fs::write(&path, &data).unwrap();

        let prefix = read_prefix(&path, SVG_SCAN_LEN).await.unwrap();
        assert_eq!(prefix, &data[..SVG_SCAN_LEN]);
        assert_eq!(detect_path(&path).await, Some(ImageMime::Png));
    }

    #[tokio::test]
    async fn test_detect_path_missing_file() {
        let dir = tempdir().unwrap();
        assert_eq!(detect_path(&dir.path().join("missing.png")).await, None);
    }
}
