//! URL path helpers.
//!
//! - Link type detection (external vs internal)
//! - Directory of a site-relative path, the way `url()` rewriting needs it

/// Check if a link is external (has a URL scheme like http:, data:, etc.)
///
/// A valid scheme must:
/// - Have at least 1 character before the colon
/// - Only contain ASCII alphanumeric or `+`, `-`, `.`
///
/// # Examples
/// ```ignore
/// assert!(is_external_link("https://example.com"));
/// assert!(is_external_link("data:image/png;base64,AAAA"));
/// assert!(!is_external_link("/about"));
/// assert!(!is_external_link("./file.txt"));
/// ```
#[inline]
pub fn is_external_link(link: &str) -> bool {
    link.find(':').is_some_and(|pos| {
        pos > 0
            && link[..pos]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Directory part of a `/`-rooted URL path.
///
/// `/theme/style.css` -> `/theme`, `/style.css` -> `/`, `style.css` -> `/`
pub fn url_dirname(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) | None => "/",
        Some(pos) => &trimmed[..pos],
    }
}

/// Directory with exactly one trailing `/`, ready to prefix a relative path.
pub fn dir_prefix(dir: &str) -> String {
    if dir.ends_with('/') {
        dir.to_string()
    } else {
        format!("{dir}/")
    }
}
