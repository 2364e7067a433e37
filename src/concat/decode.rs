//! Compact query decoding.
//!
//! ```text
//! /_static/??/foo/bar.css,/foo1/baz.css?m=293847g
//! /_static/??-eJzTT8vP109KLNJLLi7W0QdyDEE8IK4CiVjn2hpZGluYmKcDABRMDPM=
//! /_static/?%3F%2Ffoo%2Fbar.css%2C%2Ffoo1%2Fbaz.css
//! ```

use super::ConcatError;
use base64::{Engine as _, engine::general_purpose};
use flate2::read::ZlibDecoder;
use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::io::Read;

/// Largest inflated payload accepted from a `-` compressed query.
pub const MAX_INFLATED_LEN: usize = 64 * 1024;

/// A decoded concat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConcatRequest {
    /// Requested paths in request order.
    pub resource_paths: Vec<String>,
    /// Opaque token after the payload's `?` (cache busting only).
    pub version: Option<String>,
    /// Whether the payload was base64(zlib) compressed.
    pub compressed: bool,
    /// Request path before the static prefix, e.g. `/blog`.
    pub subdir_prefix: String,
}

impl ConcatRequest {
    /// Decode a raw request URI (path and query).
    pub fn decode(uri: &str, static_prefix: &str, max_files: usize) -> Result<Self, ConcatError> {
        let (path, query) = split_uri(uri);
        let query = query.filter(|q| !q.is_empty()).ok_or(ConcatError::MissingQuery)?;

        let decoded = percent_decode_str(query)
            .decode_utf8()
            .map_err(|_| ConcatError::InvalidEncoding)?;

        let marker = decoded.find('?').ok_or(ConcatError::MissingMarker)?;
        let mut payload = decoded[marker + 1..].to_string();

        let compressed = payload.starts_with('-');
        if compressed {
            payload = inflate_payload(&payload[1..])?;
        }

        let version = match payload.find('?') {
            Some(pos) => {
                let version = payload[pos + 1..].to_string();
                payload.truncate(pos);
                Some(version)
            }
            None => None,
        };

        if payload.is_empty() {
            return Err(ConcatError::EmptyList);
        }

        let resource_paths: Vec<String> = payload.split(',').map(str::to_string).collect();
        if resource_paths.len() > max_files {
            return Err(ConcatError::TooManyResources {
                count: resource_paths.len(),
                max: max_files,
            });
        }

        Ok(Self {
            resource_paths,
            version,
            compressed,
            subdir_prefix: subdir_prefix(path, static_prefix).to_string(),
        })
    }
}

/// Split a request URI into path and query, dropping any fragment.
fn split_uri(uri: &str) -> (&str, Option<&str>) {
    let uri = uri.split('#').next().unwrap_or(uri);
    match uri.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (uri, None),
    }
}

/// Text before the static prefix when it is not at the start of the path.
fn subdir_prefix<'a>(path: &'a str, static_prefix: &str) -> &'a str {
    match path.find(static_prefix) {
        Some(pos) if pos > 0 => &path[..pos],
        _ => "",
    }
}

/// `base64` → zlib inflate → UTF-8, bounded by [`MAX_INFLATED_LEN`].
fn inflate_payload(encoded: &str) -> Result<String, ConcatError> {
    let compressed = general_purpose::STANDARD
        .decode(encoded.trim_end())
        .map_err(|_| ConcatError::BadPayload("invalid base64"))?;

    let mut inflated = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .take(MAX_INFLATED_LEN as u64 + 1)
        .read_to_end(&mut inflated)
        .map_err(|_| ConcatError::BadPayload("invalid zlib stream"))?;

    if inflated.len() > MAX_INFLATED_LEN {
        return Err(ConcatError::BadPayload("inflated payload too large"));
    }

    String::from_utf8(inflated).map_err(|_| ConcatError::BadPayload("payload is not UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{Compression, write::ZlibEncoder};
    use std::io::Write;

    const PREFIX: &str = "/_static/";

    fn compress(payload: &str) -> String {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(payload.as_bytes()).unwrap();
        general_purpose::STANDARD.encode(encoder.finish().unwrap())
    }

    fn decode(uri: &str) -> Result<ConcatRequest, ConcatError> {
        ConcatRequest::decode(uri, PREFIX, 150)
    }

    #[test]
    fn test_decode_plain() {
        let req = decode("/_static/??/foo/bar.css,/foo1/bar/baz.css?m=293847g").unwrap();
        assert_eq!(req.resource_paths, vec!["/foo/bar.css", "/foo1/bar/baz.css"]);
        assert_eq!(req.version.as_deref(), Some("m=293847g"));
        assert!(!req.compressed);
        assert_eq!(req.subdir_prefix, "");
    }

    #[test]
    fn test_decode_percent_encoded() {
        let req = decode("/_static/?%3F%2Ffoo%2Fbar.css%2Cfoo1%2Fbaz.css%3Fm%3D1").unwrap();
        assert_eq!(req.resource_paths, vec!["/foo/bar.css", "foo1/baz.css"]);
        assert_eq!(req.version.as_deref(), Some("m=1"));
    }

    #[test]
    fn test_decode_compressed() {
        let uri = format!("/_static/??-{}", compress("/a.css,/b.css?m=5"));
        let req = decode(&uri).unwrap();
        assert!(req.compressed);
        assert_eq!(req.resource_paths, vec!["/a.css", "/b.css"]);
        assert_eq!(req.version.as_deref(), Some("m=5"));
    }

    #[test]
    fn test_decode_bad_compressed_payload() {
        // valid base64, not a zlib stream
        let uri = format!("/_static/??-{}", general_purpose::STANDARD.encode("hello"));
        assert!(matches!(decode(&uri), Err(ConcatError::BadPayload(_))));
        // not base64 at all
        assert!(matches!(
            decode("/_static/??-!!!"),
            Err(ConcatError::BadPayload(_))
        ));
        assert_eq!(decode("/_static/??-!!!").unwrap_err().status(), 400);
    }

    #[test]
    fn test_decode_oversized_payload() {
        let huge = "a".repeat(MAX_INFLATED_LEN + 1);
        let uri = format!("/_static/??-{}", compress(&huge));
        assert!(matches!(decode(&uri), Err(ConcatError::BadPayload(_))));
    }

    #[test]
    fn test_decode_missing_parts() {
        assert!(matches!(decode("/_static/"), Err(ConcatError::MissingQuery)));
        assert!(matches!(decode("/_static/?"), Err(ConcatError::MissingQuery)));
        assert!(matches!(
            decode("/_static/?a.css,b.css"),
            Err(ConcatError::MissingMarker)
        ));
        assert!(matches!(decode("/_static/??"), Err(ConcatError::EmptyList)));
        assert!(matches!(
            decode("/_static/???m=1"),
            Err(ConcatError::EmptyList)
        ));
        assert!(matches!(
            decode("/_static/?%FF%3F/a.css"),
            Err(ConcatError::InvalidEncoding)
        ));
    }

    #[test]
    fn test_decode_max_boundary() {
        let list = |n: usize| {
            (0..n)
                .map(|i| format!("/{i}.css"))
                .collect::<Vec<_>>()
                .join(",")
        };

        let ok = ConcatRequest::decode(&format!("/_static/??{}", list(3)), PREFIX, 3).unwrap();
        assert_eq!(ok.resource_paths.len(), 3);

        let err = ConcatRequest::decode(&format!("/_static/??{}", list(4)), PREFIX, 3).unwrap_err();
        assert!(matches!(
            err,
            ConcatError::TooManyResources { count: 4, max: 3 }
        ));
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn test_decode_subdir_prefix() {
        let req = decode("/blog/_static/??/a.css").unwrap();
        assert_eq!(req.subdir_prefix, "/blog");

        let req = decode("/_static/??/a.css").unwrap();
        assert_eq!(req.subdir_prefix, "");
    }

    #[test]
    fn test_decode_fragment_dropped() {
        let req = decode("/_static/??/a.css,/b.css#top").unwrap();
        assert_eq!(req.resource_paths, vec!["/a.css", "/b.css"]);
    }

    #[test]
    fn test_decode_keeps_empty_elements() {
        // Rejected later by the loader, before any file access
        let req = decode("/_static/??/a.css,,/b.css").unwrap();
        assert_eq!(req.resource_paths, vec!["/a.css", "", "/b.css"]);
    }
}
