//! Which assets may join a concat batch.

use super::href::{is_internal_url, realpath, root_relative, UrlParts};
use super::{Asset, AssetKind, ConcatSettings};
use std::path::Path;

/// Final say over concatenating a handle that passed every other check.
pub trait ConcatFilter {
    fn allow(&self, handle: &str, kind: AssetKind) -> bool;
}

/// Filter backed by `site.exclude`.
#[derive(Debug, Clone, Default)]
pub struct ExcludeList {
    handles: Vec<String>,
}

impl ExcludeList {
    pub fn new(handles: impl IntoIterator<Item = String>) -> Self {
        Self {
            handles: handles.into_iter().collect(),
        }
    }
}

impl ConcatFilter for ExcludeList {
    fn allow(&self, handle: &str, _kind: AssetKind) -> bool {
        !self.handles.iter().any(|h| h == handle)
    }
}

/// Batch path of an asset, or `None` if it must be printed on its own.
///
/// The first failing check wins:
/// 1. the URL path names a `.css`/`.js` file
/// 2. stylesheets: no conditional comment
/// 3. stylesheets: not an RTL variant on an RTL site
/// 4. the URL belongs to the site
/// 5. the file exists under the document root
/// 6. the filter allows it
pub fn concat_path(
    asset: &Asset,
    kind: AssetKind,
    settings: &ConcatSettings,
    root_canonical: &Path,
    filter: &dyn ConcatFilter,
) -> Option<String> {
    let extension = match kind {
        AssetKind::Style => ".css",
        AssetKind::Script => ".js",
    };
    if !UrlParts::parse(&asset.src).path.contains(extension) {
        return None;
    }

    if kind == AssetKind::Style {
        if asset.conditional.is_some() {
            return None;
        }
        if settings.rtl && asset.rtl {
            return None;
        }
    }

    if !is_internal_url(&asset.src, &settings.site_url) {
        return None;
    }

    let file = realpath(&asset.src, &settings.site_url, &settings.root)?;
    let path = root_relative(&file, root_canonical)?;

    filter.allow(&asset.handle, kind).then_some(path)
}
