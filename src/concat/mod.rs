//! Compact-query concatenation engine.
//!
//! A request such as `/_static/??/a.css,/b.css?m=100` flows through:
//!
//! ```text
//! decode ──► load ──► css rewrite / minify ──► assemble
//! (query)    (root)   (preamble accumulator)    (headers + body)
//! ```
//!
//! Every failure is a [`ConcatError`] that maps to a bare HTTP status.

mod assemble;
mod css;
mod decode;
mod error;
mod load;
mod minify;
mod source;

pub use assemble::ConcatResponse;
pub use decode::ConcatRequest;
pub use error::ConcatError;
pub use load::join_root;
pub use source::{DiskSource, FileSource};

#[cfg(test)]
pub use source::MemorySource;

use crate::config::ConcatSectionConfig;
use crate::debug;

/// Whether a request path belongs to the concat endpoint.
pub fn is_concat_path(path: &str, static_prefix: &str) -> bool {
    path.contains(static_prefix)
}

/// Serve one concat request.
///
/// `HEAD` yields the same response as `GET`; dropping the body is up to the
/// transport.
pub fn handle(
    method: &str,
    uri: &str,
    config: &ConcatSectionConfig,
    source: &dyn FileSource,
) -> Result<ConcatResponse, ConcatError> {
    if !matches!(method, "GET" | "HEAD") {
        return Err(ConcatError::MethodNotAllowed(method.to_string()));
    }

    let request = ConcatRequest::decode(uri, &config.static_prefix, config.max_files)?;
    debug!(
        "concat";
        "{} resources{}{}",
        request.resource_paths.len(),
        if request.compressed { " (compressed)" } else { "" },
        request
            .version
            .as_deref()
            .map(|v| format!(", version {v}"))
            .unwrap_or_default()
    );

    let batch = load::load_resources(&request.resource_paths, config, source)?;
    Ok(assemble::assemble(batch, &request.subdir_prefix, config))
}
