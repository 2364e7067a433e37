//! MIME type detection utilities.
//!
//! The concat endpoint only knows the types listed in `[concat.types]`;
//! this module holds the defaults and the lookups shared by the loader and
//! the static file fallback.

use std::path::Path;

/// Common MIME type constants.
pub mod types {
    pub const CSS: &str = "text/css";
    pub const JAVASCRIPT: &str = "application/javascript";
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const SVG: &str = "image/svg+xml";
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const GIF: &str = "image/gif";
    pub const WEBP: &str = "image/webp";
    pub const ICO: &str = "image/x-icon";
    pub const WOFF: &str = "font/woff";
    pub const WOFF2: &str = "font/woff2";
    pub const TTF: &str = "font/ttf";
    pub const OCTET_STREAM: &str = "application/octet-stream";
}

/// Extension of a request path: everything after the last `.`.
///
/// Unlike [`Path::extension`] this does not stop at `/`, so `a.dir/file`
/// yields `dir/file`, which never matches a configured type.
pub fn extension_of(path: &str) -> Option<&str> {
    path.rfind('.').map(|pos| &path[pos + 1..])
}

/// Whether a concat MIME type is a stylesheet.
#[inline]
pub fn is_css(mime: &str) -> bool {
    mime == types::CSS
}

/// Whether a concat MIME type is a script.
#[inline]
pub fn is_javascript(mime: &str) -> bool {
    mime == types::JAVASCRIPT || mime == "text/javascript"
}

/// Guess MIME type for the static file fallback.
pub fn from_path(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("css") => types::CSS,
        Some("js" | "mjs") => types::JAVASCRIPT,
        Some("html" | "htm") => types::HTML,
        Some("txt") => types::PLAIN,
        Some("json" | "map") => types::JSON,
        Some("svg") => types::SVG,
        Some("png") => types::PNG,
        Some("jpg" | "jpeg") => types::JPEG,
        Some("gif") => types::GIF,
        Some("webp") => types::WEBP,
        Some("ico") => types::ICO,
        Some("woff") => types::WOFF,
        Some("woff2") => types::WOFF2,
        Some("ttf") => types::TTF,
        _ => types::OCTET_STREAM,
    }
}
