//! URL to filesystem path resolution for single static files.

use crate::concat::ConcatError;
use crate::utils::path::canonical_within;
use std::path::{Path, PathBuf};

/// Resolve URL to a file under `root`, handling index.html for directories.
///
/// Missing files are 404; anything that canonicalizes outside the root is 403.
pub fn resolve_path(url: &str, root: &Path) -> Result<PathBuf, ConcatError> {
    let clean = normalize_url(url);
    if clean.contains('\0') {
        return Err(ConcatError::InvalidPath(clean.escape_default().to_string()));
    }

    let local = root.join(&clean);
    if !local.exists() {
        return Err(ConcatError::NotFound(format!("/{clean}")));
    }

    let canonical =
        canonical_within(&local, root).ok_or_else(|| ConcatError::Forbidden(format!("/{clean}")))?;

    if canonical.is_file() {
        return Ok(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Ok(index);
        }
    }

    Err(ConcatError::NotFound(format!("/{clean}")))
}

/// Normalize URL: decode, strip query string, trim slashes
fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    decoded.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("public");
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("a.css"), "a{}").unwrap();
        fs::write(root.join("docs/index.html"), "<p>").unwrap();
        fs::write(dir.path().join("secret.txt"), "x").unwrap();
        (dir, root)
    }

    #[test]
    fn test_resolve_file_and_index() {
        let (_dir, root) = site();
        assert!(resolve_path("/a.css?ver=1", &root).unwrap().ends_with("a.css"));
        assert!(resolve_path("/docs/", &root).unwrap().ends_with("docs/index.html"));
        assert!(resolve_path("/%61.css", &root).is_ok());
    }

    #[test]
    fn test_resolve_errors() {
        let (_dir, root) = site();
        assert_eq!(resolve_path("/missing.css", &root).unwrap_err().status(), 404);
        assert_eq!(resolve_path("/../secret.txt", &root).unwrap_err().status(), 403);
        assert_eq!(resolve_path("/%2e%2e/secret.txt", &root).unwrap_err().status(), 403);
        assert_eq!(resolve_path("/", &root).unwrap_err().status(), 404);
    }
}
