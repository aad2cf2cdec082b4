use keyhole_core::Extension;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

// No markup types (html, svg): uploads are served from our own origin.
const KNOWN_TYPES: &[(&str, &str)] = &[
    ("avif", "image/avif"),
    ("bmp", "image/bmp"),
    ("gif", "image/gif"),
    ("ico", "image/x-icon"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("csv", "text/csv; charset=utf-8"),
    ("md", "text/markdown; charset=utf-8"),
    ("txt", "text/plain; charset=utf-8"),
    ("gz", "application/gzip"),
    ("json", "application/json"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("mp3", "audio/mpeg"),
    ("ogg", "audio/ogg"),
    ("wav", "audio/wav"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
];

/// Picks a content type for a blob from its extension.
pub fn infer(ext: Option<&Extension>) -> &'static str {
    ext.and_then(|ext| {
        KNOWN_TYPES
            .iter()
            .find(|(known, _)| ext.bare().eq_ignore_ascii_case(known))
            .map(|(_, content_type)| *content_type)
    })
    .unwrap_or(DEFAULT_CONTENT_TYPE)
}

/// Checks that a caller-supplied content type can be echoed back as a header.
pub fn is_valid(content_type: &str) -> bool {
    content_type.len() <= 255
        && content_type.contains('/')
        && content_type.bytes().all(|b| b == b' ' || b.is_ascii_graphic())
}
