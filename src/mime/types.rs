use serde::{Deserialize, Serialize};
use std::fmt;

/// Image MIME types the detector can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageMime {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/gif")]
    Gif,
    #[serde(rename = "image/webp")]
    Webp,
    #[serde(rename = "image/bmp")]
    Bmp,
    #[serde(rename = "image/tiff")]
    Tiff,
    #[serde(rename = "image/x-icon")]
    Icon,
    #[serde(rename = "image/avif")]
    Avif,
    #[serde(rename = "image/svg+xml")]
    Svg,
    #[serde(rename = "image/heic")]
    Heic,
    #[serde(rename = "image/heif")]
    Heif,
}

impl ImageMime {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
            ImageMime::Gif => "image/gif",
            ImageMime::Webp => "image/webp",
            ImageMime::Bmp => "image/bmp",
            ImageMime::Tiff => "image/tiff",
            ImageMime::Icon => "image/x-icon",
            ImageMime::Avif => "image/avif",
            ImageMime::Svg => "image/svg+xml",
            ImageMime::Heic => "image/heic",
            ImageMime::Heif => "image/heif",
        }
    }

    /// Canonical file extension, used when naming uploaded objects.
    pub fn extension(self) -> &'static str {
        match self {
            ImageMime::Jpeg => "jpg",
            ImageMime::Png => "png",
            ImageMime::Gif => "gif",
            ImageMime::Webp => "webp",
            ImageMime::Bmp => "bmp",
            ImageMime::Tiff => "tiff",
            ImageMime::Icon => "ico",
            ImageMime::Avif => "avif",
            ImageMime::Svg => "svg",
            ImageMime::Heic => "heic",
            ImageMime::Heif => "heif",
        }
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
