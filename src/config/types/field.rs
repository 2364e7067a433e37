//! Type-safe config field path.

/// A dotted path to a config field, used in diagnostics.
///
/// # Example
///
/// ```ignore
/// diag.error(FieldPath::new("concat.max_files"), "must be at least 1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(pub &'static str);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

