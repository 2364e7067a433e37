//! Concat URL construction.
//!
//! ```text
//! {site}/_static/??/a.css,/b.css?m=1718461845
//! {site}/_static/??-eJzTT8vP109KLNJLLi7W0QdyDEE8IK4CiVjn2hpZGluYmKcDABRMDPM=
//! {site}/wp-content/single.css?m=1718461845g
//! ```

use super::ConcatSettings;
use crate::concat::{DiskSource, FileSource, join_root};
use crate::utils::path::canonical_within;
use base64::{Engine as _, engine::general_purpose};
use flate2::{Compression, write::ZlibEncoder};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Host and path of an asset or site URL.
///
/// Site-relative sources (`/css/a.css`) have no host; protocol-relative ones
/// (`//cdn.example.com/a.js`) do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    pub host: Option<String>,
    pub path: String,
}

impl UrlParts {
    pub fn parse(url: &str) -> Self {
        let absolute = if url.starts_with("//") {
            url::Url::parse(&format!("http:{url}")).ok()
        } else {
            url::Url::parse(url).ok()
        };

        match absolute {
            Some(parsed) if parsed.has_host() => Self {
                host: parsed.host_str().map(str::to_string),
                path: parsed.path().to_string(),
            },
            _ => Self {
                host: None,
                path: url
                    .split(['?', '#'])
                    .next()
                    .unwrap_or_default()
                    .to_string(),
            },
        }
    }
}

/// Path component of the site URL, without a trailing `/` (`""` at the root).
pub fn site_path(site_url: &str) -> String {
    url::Url::parse(site_url)
        .map(|url| url.path().trim_end_matches('/').to_string())
        .unwrap_or_default()
}

/// Whether `url` is served by the site at `site_url`.
pub fn is_internal_url(url: &str, site_url: &str) -> bool {
    let test = UrlParts::parse(url);
    let site = UrlParts::parse(site_url);

    let Some(host) = &test.host else {
        return true;
    };
    if site.host.as_deref() != Some(host.as_str()) {
        return false;
    }
    let prefix = site.path.trim_end_matches('/');
    prefix.is_empty()
        || test
            .path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Canonical file behind an asset URL, if it exists under `root`.
pub fn realpath(url: &str, site_url: &str, root: &Path) -> Option<PathBuf> {
    let path = UrlParts::parse(url).path;
    let prefix = site_path(site_url);
    let path = match path.strip_prefix(prefix.as_str()) {
        Some(rest) if !prefix.is_empty() => rest,
        _ => path.as_str(),
    };
    canonical_within(&join_root(root, path), root)
}

/// `/`-rooted path of a canonical file relative to the canonical root.
pub fn root_relative(file: &Path, root_canonical: &Path) -> Option<String> {
    let rel = file.strip_prefix(root_canonical).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Some(format!("/{}", parts.join("/")))
}

/// Newest mtime of the given site-relative paths (missing files count as 0).
pub fn max_mtime(root: &Path, paths: &[String]) -> u64 {
    paths
        .iter()
        .map(|p| DiskSource.mtime(&join_root(root, p)).unwrap_or(0))
        .max()
        .unwrap_or(0)
}

/// `-` + base64(zlib(payload)), the compressed query form.
pub fn compress_payload(payload: &str) -> Option<String> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload.as_bytes()).ok()?;
    let compressed = encoder.finish().ok()?;
    Some(format!("-{}", general_purpose::STANDARD.encode(compressed)))
}

/// URL for several site-relative paths served as one response.
///
/// `suffix` is appended to the mtime token (`j` for scripts).
pub fn concat_href(settings: &ConcatSettings, paths: &[String], suffix: &str) -> String {
    let mtime = max_mtime(&settings.root, paths);
    let mut payload = format!("{}?m={mtime}{suffix}", paths.join(","));

    if settings.allow_gzip_compression
        && let Some(compressed) = compress_payload(&payload)
        && payload.len() > compressed.len()
    {
        payload = compressed;
    }

    format!("{}{}??{payload}", settings.site_url, settings.static_prefix)
}

/// Append a `?m=<mtime>g` token so a single file is re-fetched when it changes.
///
/// URLs already carrying `?m=` and URLs whose file cannot be found are
/// returned unchanged; an existing query is kept after `&amp;`.
pub fn cache_bust_mtime(url: &str, settings: &ConcatSettings) -> String {
    if url.find("?m=").is_some_and(|pos| pos > 0) {
        return url.to_string();
    }
    if UrlParts::parse(url).path.is_empty() {
        return url.to_string();
    }

    let mtime = realpath(url, &settings.site_url, &settings.root)
        .and_then(|file| DiskSource.mtime(&file).ok())
        .unwrap_or(0);
    if mtime == 0 {
        return url.to_string();
    }

    match url.split_once('?') {
        Some((base, query)) if !query.is_empty() => format!("{base}?m={mtime}g&amp;{query}"),
        Some((base, _)) => format!("{base}?m={mtime}g"),
        None => format!("{url}?m={mtime}g"),
    }
}

/// `href` for one batch: compact form for several paths, cache-busted for one.
pub fn batch_href(settings: &ConcatSettings, paths: &[String], suffix: &str) -> String {
    match paths {
        [single] => cache_bust_mtime(&format!("{}{single}", settings.site_url), settings),
        _ => concat_href(settings, paths, suffix),
    }
}

/// One `href` per `max_files` paths, in order.
pub fn batch_hrefs(settings: &ConcatSettings, paths: &[String], suffix: &str) -> Vec<String> {
    paths
        .chunks(settings.max_files.max(1))
        .map(|chunk| batch_href(settings, chunk, suffix))
        .collect()
}
