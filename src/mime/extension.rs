use super::ImageMime;

/// Map a filename's extension to an image MIME type.
///
/// Only the text after the last `.` is considered, case-insensitively.
pub fn detect_by_extension(filename: Option<&str>) -> Option<ImageMime> {
    let (_, extension) = filename?.rsplit_once('.')?;

    let mime = match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => ImageMime::Jpeg,
        "png" => ImageMime::Png,
        "gif" => ImageMime::Gif,
        "bmp" => ImageMime::Bmp,
        "webp" => ImageMime::Webp,
        "svg" => ImageMime::Svg,
        "tiff" | "tif" => ImageMime::Tiff,
        "ico" => ImageMime::Icon,
        "avif" => ImageMime::Avif,
        "heic" => ImageMime::Heic,
        "heif" => ImageMime::Heif,
        _ => return None,
    };

    Some(mime)
}
