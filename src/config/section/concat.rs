//! `[concat]` section configuration.
//!
//! Controls the concatenation endpoint and the URLs built for it.
//!
//! # Example
//!
//! ```toml
//! [concat]
//! root = "public"               # Document root (relative to concat.toml)
//! static_prefix = "/_static/"   # Path segment routed to the engine
//! max_files = 150               # Resources allowed in one request
//! unique_types = true           # Reject batches mixing MIME types
//! allow_gzip_compression = true # Emit `??-<base64>` URLs when shorter
//! minify_css = true
//! minify_js = false
//!
//! [concat.types]
//! css = "text/css"
//! js = "application/javascript"
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::utils::mime::types;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default number of resources accepted in one request.
pub const DEFAULT_MAX_FILES: usize = 150;

/// Concatenation engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcatSectionConfig {
    /// Document root every requested path is resolved against.
    pub root: PathBuf,

    /// Path segment that marks a concat request (`/_static/??a.css,b.css`).
    pub static_prefix: String,

    /// Maximum number of resources in one request.
    pub max_files: usize,

    /// Require every resource of a request to share one MIME type.
    pub unique_types: bool,

    /// Allow `-<base64(zlib)>` payloads when generating URLs.
    pub allow_gzip_compression: bool,

    /// Minify stylesheets after rewriting.
    pub minify_css: bool,

    /// Minify scripts before joining them.
    pub minify_js: bool,

    /// Extension → MIME type map. Only these extensions may be concatenated.
    pub types: BTreeMap<String, String>,
}

impl Default for ConcatSectionConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            static_prefix: "/_static/".into(),
            max_files: DEFAULT_MAX_FILES,
            unique_types: true,
            allow_gzip_compression: true,
            minify_css: true,
            minify_js: false,
            types: BTreeMap::from([
                ("css".into(), types::CSS.into()),
                ("js".into(), types::JAVASCRIPT.into()),
            ]),
        }
    }
}

impl ConcatSectionConfig {
    const ROOT: FieldPath = FieldPath::new("concat.root");
    const STATIC_PREFIX: FieldPath = FieldPath::new("concat.static_prefix");
    const MAX_FILES: FieldPath = FieldPath::new("concat.max_files");
    const TYPES: FieldPath = FieldPath::new("concat.types");

    /// MIME type registered for an extension.
    pub fn mime_for(&self, ext: &str) -> Option<&str> {
        self.types.get(ext).map(String::as_str)
    }

    /// Validate concat configuration.
    ///
    /// # Checks
    /// - `root` is an existing directory
    /// - `static_prefix` starts and ends with `/`
    /// - `max_files` is at least 1
    /// - `types` is non-empty, extensions have no dots, types are non-empty
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.root.is_dir() {
            diag.error_with_hint(
                Self::ROOT,
                format!("`{}` is not a directory", self.root.display()),
                "point it at the directory the static files are served from",
            );
        }

        if self.static_prefix.len() < 2
            || !self.static_prefix.starts_with('/')
            || !self.static_prefix.ends_with('/')
        {
            diag.error_with_hint(
                Self::STATIC_PREFIX,
                format!("`{}` must start and end with `/`", self.static_prefix),
                "use something like \"/_static/\"",
            );
        }

        if self.max_files == 0 {
            diag.error(Self::MAX_FILES, "must be at least 1");
        }

        if self.types.is_empty() {
            diag.error(Self::TYPES, "at least one extension must be configured");
        }
        for (ext, mime) in &self.types {
            if ext.is_empty() || ext.contains('.') {
                diag.error(Self::TYPES, format!("invalid extension `{ext}`"));
            }
            if mime.trim().is_empty() {
                diag.error(Self::TYPES, format!("empty MIME type for `{ext}`"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_concat_defaults() {
        let config = test_parse_config("");

        assert_eq!(config.concat.static_prefix, "/_static/");
        assert_eq!(config.concat.max_files, DEFAULT_MAX_FILES);
        assert!(config.concat.unique_types);
        assert!(config.concat.allow_gzip_compression);
        assert!(config.concat.minify_css);
        assert!(!config.concat.minify_js);
        assert_eq!(config.concat.mime_for("css"), Some("text/css"));
        assert_eq!(config.concat.mime_for("js"), Some("application/javascript"));
        assert_eq!(config.concat.mime_for("png"), None);
    }

    #[test]
    fn test_concat_types_replace_defaults() {
        let config = test_parse_config("[concat.types]\ntxt = \"text/plain\"");

        assert_eq!(config.concat.mime_for("txt"), Some("text/plain"));
        assert_eq!(config.concat.mime_for("css"), None);
    }

    #[test]
    fn test_concat_validate() {
        let mut section = ConcatSectionConfig {
            root: PathBuf::from("/definitely/not/here"),
            static_prefix: "_static".into(),
            max_files: 0,
            ..ConcatSectionConfig::default()
        };
        section.types.insert("min.js".into(), String::new());

        let mut diag = ConfigDiagnostics::new();
        section.validate(&mut diag);
        // root, prefix, max_files, extension, empty mime
        assert_eq!(diag.errors().len(), 5);
    }

    #[test]
    fn test_concat_validate_ok() {
        let dir = tempfile::TempDir::new().unwrap();
        let section = ConcatSectionConfig {
            root: dir.path().to_path_buf(),
            ..ConcatSectionConfig::default()
        };

        let mut diag = ConfigDiagnostics::new();
        section.validate(&mut diag);
        assert!(diag.is_empty());
    }
}
