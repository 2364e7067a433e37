//! Path normalization utilities.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `canonical_within` - canonicalize and require the result under a root

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Canonicalize `path` and return it only if it lies under `root`.
///
/// Both sides are canonicalized, so symlinks pointing out of the root and
/// `..` segments are resolved before the containment check.
pub fn canonical_within(path: &Path, root: &Path) -> Option<PathBuf> {
    let canonical = path.canonicalize().ok()?;
    let root_canonical = root.canonicalize().ok()?;
    canonical.starts_with(&root_canonical).then_some(canonical)
}
