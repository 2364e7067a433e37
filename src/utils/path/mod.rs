//! Path and URL utilities.
//!
//! Pure functions for path manipulation. No side effects apart from
//! canonicalization in [`fs`].
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `canonical_within`)
//! - [`route`]: URL path helpers (`is_external_link`, `url_dirname`, `dir_prefix`)

pub mod fs;
pub mod route;

pub use fs::{canonical_within, normalize_path};
pub use route::{dir_prefix, is_external_link, url_dirname};
