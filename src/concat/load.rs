//! Resource resolution and validation.
//!
//! Fail fast: the first bad resource rejects the whole batch.

use super::{ConcatError, FileSource};
use crate::config::ConcatSectionConfig;
use crate::utils::mime::extension_of;
use std::path::{Path, PathBuf};

/// A requested file, validated and read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    /// Path as it appeared in the request.
    pub requested_path: String,
    /// Document root joined with the requested path.
    pub file_path: PathBuf,
    pub mime_type: String,
    /// Seconds since the Unix epoch.
    pub mtime: u64,
    pub bytes: Vec<u8>,
}

/// Ordered resources plus the values derived across the batch.
#[derive(Debug)]
pub struct LoadedBatch {
    pub resources: Vec<ResolvedResource>,
    /// Type of the last resource (the shared type when types are unique).
    pub mime_type: String,
    /// Newest mtime in the batch.
    pub last_modified: u64,
}

/// Reject paths that must never reach the filesystem.
pub fn screen_path(path: &str) -> Result<(), ConcatError> {
    if path.is_empty() || path.contains("..") || path.contains('\0') {
        return Err(ConcatError::InvalidPath(path.escape_default().to_string()));
    }
    Ok(())
}

/// Join the document root and a request path with exactly one separator.
pub fn join_root(root: &Path, path: &str) -> PathBuf {
    root.join(path.trim_start_matches('/'))
}

/// Resolve, validate and read every requested resource in order.
pub fn load_resources(
    paths: &[String],
    config: &ConcatSectionConfig,
    source: &dyn FileSource,
) -> Result<LoadedBatch, ConcatError> {
    // Screen the whole list first so a bad path anywhere prevents every read.
    for path in paths {
        screen_path(path)?;
    }

    let mut resources = Vec::with_capacity(paths.len());
    let mut batch_type: Option<String> = None;
    let mut last_modified = 0;

    for path in paths {
        let file_path = join_root(&config.root, path);

        if !source.exists(&file_path) {
            return Err(ConcatError::NotFound(path.clone()));
        }

        let mime_type = extension_of(path)
            .and_then(|ext| config.mime_for(ext))
            .ok_or_else(|| ConcatError::UnsupportedType(path.clone()))?
            .to_string();

        if config.unique_types
            && let Some(expected) = &batch_type
            && *expected != mime_type
        {
            return Err(ConcatError::MixedTypes {
                path: path.clone(),
                expected: expected.clone(),
                found: mime_type,
            });
        }

        let mtime = source.mtime(&file_path).map_err(|source| ConcatError::Stat {
            path: path.clone(),
            source,
        })?;
        last_modified = last_modified.max(mtime);

        let bytes = source.read(&file_path).map_err(|source| ConcatError::Read {
            path: path.clone(),
            source,
        })?;

        batch_type = Some(mime_type.clone());
        resources.push(ResolvedResource {
            requested_path: path.clone(),
            file_path,
            mime_type,
            mtime,
            bytes,
        });
    }

    Ok(LoadedBatch {
        resources,
        mime_type: batch_type.unwrap_or_default(),
        last_modified,
    })
}
