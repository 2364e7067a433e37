//! Response assembly.

use super::css::{self, Preamble};
use super::load::LoadedBatch;
use super::minify;
use crate::config::ConcatSectionConfig;
use crate::utils::date::http_date;
use crate::utils::mime::{is_css, is_javascript};

/// A complete concat response. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatResponse {
    pub body: Vec<u8>,
    pub content_type: String,
    /// Newest mtime of the batch, in seconds since the Unix epoch.
    pub last_modified: u64,
}

impl ConcatResponse {
    /// `Last-Modified` header value.
    pub fn last_modified_header(&self) -> String {
        http_date(self.last_modified)
    }

    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    /// Headers sent with a successful response, in order.
    pub fn headers(&self) -> [(&'static str, String); 3] {
        [
            ("Last-Modified", self.last_modified_header()),
            ("Content-Length", self.content_length().to_string()),
            ("Content-Type", self.content_type.clone()),
        ]
    }
}

/// Rewrite, minify and join a loaded batch.
///
/// The preamble is emitted first, then each processed body in request order.
pub fn assemble(
    batch: LoadedBatch,
    subdir_prefix: &str,
    config: &ConcatSectionConfig,
) -> ConcatResponse {
    let mut preamble = Preamble::default();
    let mut output = Vec::new();

    for resource in batch.resources {
        if is_css(&resource.mime_type) {
            let dir = css::resource_dir(subdir_prefix, &resource.requested_path);
            let body = css::rewrite(&resource.bytes, &dir, &mut preamble);
            let body = if config.minify_css {
                minify_bytes(body, &resource.requested_path, minify::minify_css)
            } else {
                body
            };
            output.extend_from_slice(&body);
        } else if is_javascript(&resource.mime_type) {
            let body = if config.minify_js {
                minify_bytes(resource.bytes, &resource.requested_path, minify::minify_js)
            } else {
                resource.bytes
            };
            output.extend_from_slice(&body);
            output.extend_from_slice(b";\n");
        } else {
            output.extend_from_slice(&resource.bytes);
        }
    }

    let mut body = preamble.render();
    body.extend_from_slice(&output);

    ConcatResponse {
        body,
        content_type: batch.mime_type,
        last_modified: batch.last_modified,
    }
}

/// Minify a body that is valid UTF-8; any other body is kept as is.
fn minify_bytes(body: Vec<u8>, requested_path: &str, minifier: fn(&str) -> Option<String>) -> Vec<u8> {
    match String::from_utf8(body) {
        Ok(text) => minify::minify_or_keep(text, requested_path, minifier).into_bytes(),
        Err(e) => e.into_bytes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concat::load::ResolvedResource;
    use std::path::PathBuf;

    fn resource(path: &str, mime: &str, mtime: u64, body: &str) -> ResolvedResource {
        ResolvedResource {
            requested_path: path.into(),
            file_path: PathBuf::from(path),
            mime_type: mime.into(),
            mtime,
            bytes: body.as_bytes().to_vec(),
        }
    }

    fn plain() -> ConcatSectionConfig {
        ConcatSectionConfig {
            minify_css: false,
            minify_js: false,
            ..ConcatSectionConfig::default()
        }
    }

    #[test]
    fn test_assemble_js_terminators() {
        let batch = LoadedBatch {
            resources: vec![
                resource("/a.js", "application/javascript", 1, "a()"),
                resource("/b.js", "application/javascript", 2, "b()"),
            ],
            mime_type: "application/javascript".into(),
            last_modified: 2,
        };
        let res = assemble(batch, "", &plain());
        assert_eq!(res.body, b"a();\nb();\n");
        assert_eq!(res.content_type, "application/javascript");
    }

    #[test]
    fn test_assemble_preamble_first() {
        let batch = LoadedBatch {
            resources: vec![
                resource("/a/one.css", "text/css", 1, "a{color:red}"),
                resource("/b/two.css", "text/css", 1, "@import \"x.css\";\nb{color:blue}"),
            ],
            mime_type: "text/css".into(),
            last_modified: 1,
        };
        let res = assemble(batch, "", &plain());
        let body = String::from_utf8(res.body).unwrap();

        assert!(body.starts_with("@import \"/b/x.css\";\n"));
        let a = body.find("a{color:red}").unwrap();
        let b = body.find("b{color:blue}").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_assemble_minified_css() {
        let batch = LoadedBatch {
            resources: vec![resource(
                "/t/s.css",
                "text/css",
                1,
                "body {\n  background: url(img/bg.png);\n}\n",
            )],
            mime_type: "text/css".into(),
            last_modified: 1,
        };
        let res = assemble(batch, "", &ConcatSectionConfig::default());
        let body = String::from_utf8(res.body).unwrap();
        assert!(body.contains("/t/img/bg.png"));
        assert!(!body.contains('\n'));
    }

    #[test]
    fn test_assemble_invalid_css_passes_through() {
        let css = "a{color:red}}}{{ ;;";
        let batch = LoadedBatch {
            resources: vec![resource("/a.css", "text/css", 1, css)],
            mime_type: "text/css".into(),
            last_modified: 1,
        };
        let res = assemble(batch, "", &ConcatSectionConfig::default());
        assert!(!res.body.is_empty());
    }

    #[test]
    fn test_assemble_latin1_css_untouched() {
        let bytes = b"@charset \"iso-8859-1\";\na:after{content:\"\xe9\"}".to_vec();
        let batch = LoadedBatch {
            resources: vec![ResolvedResource {
                bytes,
                ..resource("/a.css", "text/css", 1, "")
            }],
            mime_type: "text/css".into(),
            last_modified: 1,
        };
        let res = assemble(batch, "", &ConcatSectionConfig::default());
        assert_eq!(
            res.body,
            b"@charset \"iso-8859-1\";\n\na:after{content:\"\xe9\"}".to_vec()
        );
    }

    #[test]
    fn test_response_headers() {
        let res = ConcatResponse {
            body: b"abc".to_vec(),
            content_type: "text/css".into(),
            last_modified: 300,
        };
        let headers = res.headers();
        assert_eq!(headers[0], ("Last-Modified", "Thu, 01 Jan 1970 00:05:00 GMT".into()));
        assert_eq!(headers[1], ("Content-Length", "3".into()));
        assert_eq!(headers[2], ("Content-Type", "text/css".into()));
    }
}
