//! File access used by the resource loader.
//!
//! The loader never touches `std::fs` directly so tests can count reads and
//! simulate stat failures.

use std::{
    fs, io,
    path::Path,
    time::UNIX_EPOCH,
};

/// Read-only view of the document root.
pub trait FileSource: Send + Sync {
    /// Whether a regular file exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Modification time in seconds since the Unix epoch.
    fn mtime(&self, path: &Path) -> io::Result<u64>;

    /// Full file contents.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Synchronous, uncached filesystem access.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskSource;

impl FileSource for DiskSource {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn mtime(&self, path: &Path) -> io::Result<u64> {
        let modified = fs::metadata(path)?.modified()?;
        Ok(modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0))
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}

#[cfg(test)]
pub use memory::MemorySource;
