//! Magic-byte signature table and matcher.
//!
//! Rules are evaluated in table order and the first match wins. Every rule
//! needs at least [`MIN_SIGNATURE_LEN`] bytes; shorter buffers never match.

use super::ImageMime;

/// Buffers shorter than this are always undetected.
pub const MIN_SIGNATURE_LEN: usize = 12;

/// How many leading bytes the SVG text scan looks at.
pub const SVG_SCAN_LEN: usize = 100;

#[derive(Debug, Clone, Copy)]
enum Segment {
    Exact {
        offset: usize,
        bytes: &'static [u8],
    },
    OneOf {
        offset: usize,
        choices: &'static [u8],
    },
}

impl Segment {
    fn matches(&self, data: &[u8]) -> bool {
        match *self {
            Segment::Exact { offset, bytes } => data.get(offset..offset + bytes.len()) == Some(bytes),
            Segment::OneOf { offset, choices } => {
                data.get(offset).is_some_and(|b| choices.contains(b))
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Matcher {
    /// All segments must match.
    Segments(&'static [Segment]),
    /// ISO-BMFF `ftyp` box at offset 4 whose major brand (offset 8) is in the set.
    FtypBrand(&'static [[u8; 4]]),
    SvgText,
}

impl Matcher {
    fn matches(&self, data: &[u8]) -> bool {
        match *self {
            Matcher::Segments(segments) => segments.iter().all(|s| s.matches(data)),
            Matcher::FtypBrand(brands) => {
                data.get(4..8) == Some(b"ftyp".as_slice())
                    && data
                        .get(8..12)
                        .is_some_and(|brand| brands.iter().any(|b| brand == b.as_slice()))
            }
            Matcher::SvgText => looks_like_svg(data),
        }
    }
}

/// One entry of [`SIGNATURE_RULES`].
#[derive(Debug)]
pub struct SignatureRule {
    name: &'static str,
    mime: ImageMime,
    matcher: Matcher,
}

impl SignatureRule {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn mime(&self) -> ImageMime {
        self.mime
    }

    pub fn matches(&self, data: &[u8]) -> bool {
        data.len() >= MIN_SIGNATURE_LEN && self.matcher.matches(data)
    }
}

const fn exact(offset: usize, bytes: &'static [u8]) -> Segment {
    Segment::Exact { offset, bytes }
}

/// Signature rules in priority order.
pub static SIGNATURE_RULES: &[SignatureRule] = &[
    SignatureRule {
        name: "jpeg",
        mime: ImageMime::Jpeg,
        matcher: Matcher::Segments(&[exact(0, &[0xFF, 0xD8, 0xFF])]),
    },
    SignatureRule {
        name: "png",
        mime: ImageMime::Png,
        matcher: Matcher::Segments(&[exact(
            0,
            &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
        )]),
    },
    SignatureRule {
        name: "gif",
        mime: ImageMime::Gif,
        matcher: Matcher::Segments(&[
            exact(0, b"GIF8"),
            Segment::OneOf {
                offset: 4,
                choices: &[0x37, 0x39],
            },
            exact(5, &[0x61]),
        ]),
    },
    SignatureRule {
        name: "webp",
        mime: ImageMime::Webp,
        matcher: Matcher::Segments(&[exact(0, b"RIFF"), exact(8, b"WEBP")]),
    },
    SignatureRule {
        name: "bmp",
        mime: ImageMime::Bmp,
        matcher: Matcher::Segments(&[exact(0, b"BM")]),
    },
    SignatureRule {
        name: "tiff-le",
        mime: ImageMime::Tiff,
        matcher: Matcher::Segments(&[exact(0, &[0x49, 0x49, 0x2A, 0x00])]),
    },
    SignatureRule {
        name: "tiff-be",
        mime: ImageMime::Tiff,
        matcher: Matcher::Segments(&[exact(0, &[0x4D, 0x4D, 0x00, 0x2A])]),
    },
    SignatureRule {
        name: "ico",
        mime: ImageMime::Icon,
        matcher: Matcher::Segments(&[exact(0, &[0x00, 0x00, 0x01, 0x00])]),
    },
    SignatureRule {
        name: "avif",
        mime: ImageMime::Avif,
        matcher: Matcher::FtypBrand(&[*b"avif", *b"avis"]),
    },
    SignatureRule {
        name: "svg",
        mime: ImageMime::Svg,
        matcher: Matcher::SvgText,
    },
    SignatureRule {
        name: "heic",
        mime: ImageMime::Heic,
        matcher: Matcher::FtypBrand(&[
            *b"heic", *b"heix", *b"hevc", *b"hevx", *b"heim", *b"heis", *b"hevm", *b"hevs",
            *b"mif1",
        ]),
    },
    // TODO: confirm with product whether a second HEIF brand (e.g. "mif2") belongs here.
    SignatureRule {
        name: "heif",
        mime: ImageMime::Heif,
        matcher: Matcher::FtypBrand(&[*b"heif"]),
    },
];

fn looks_like_svg(data: &[u8]) -> bool {
    let window = &data[..data.len().min(SVG_SCAN_LEN)];
    let text = match std::str::from_utf8(window) {
        Ok(text) => text,
        // A character split by the window edge is dropped.
        Err(e) if e.error_len().is_none() => {
            std::str::from_utf8(&window[..e.valid_up_to()]).unwrap_or_default()
        }
        Err(_) => return false,
    };

    text.contains("<svg") || (text.contains("<?xml") && text.contains("svg"))
}

/// Classify `bytes` by magic-byte signature.
pub fn detect_by_signature(bytes: &[u8]) -> Option<ImageMime> {
    if bytes.len() < MIN_SIGNATURE_LEN {
        tracing::debug!(
            "Buffer too short for signature detection ({} bytes)",
            bytes.len()
        );
        return None;
    }

    match SIGNATURE_RULES.iter().find(|rule| rule.matches(bytes)) {
        Some(rule) => {
            tracing::debug!("Matched signature rule '{}' ({})", rule.name, rule.mime);
            Some(rule.mime)
        }
        None => {
            tracing::debug!(
                "No signature matched (first 4 bytes: {:02X?})",
                &bytes[..4]
            );
            None
        }
    }
}

/// Every rule matching `bytes`, in evaluation order.
pub fn matching_rules(bytes: &[u8]) -> impl Iterator<Item = &'static SignatureRule> + '_ {
    SIGNATURE_RULES.iter().filter(move |rule| rule.matches(bytes))
}
