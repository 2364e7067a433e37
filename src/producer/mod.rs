//! Asset-queue concatenation: the side that writes compact-query URLs.
//!
//! | Module        | Purpose                                        |
//! |---------------|------------------------------------------------|
//! | `registry`    | Registered assets, queue, dependency order     |
//! | `manifest`    | TOML asset manifest                            |
//! | `eligibility` | Which assets may join a batch                  |
//! | `href`        | Concat and cache-busted URLs                   |
//! | `render`      | `<link>` / `<script>` output                   |

mod eligibility;
pub mod href;
mod manifest;
mod registry;
mod render;

pub use eligibility::{ConcatFilter, ExcludeList};
pub use manifest::Manifest;
pub use registry::{Asset, AssetRegistry};
pub use render::AssetConcat;

use crate::config::ConcatConfig;
use std::path::PathBuf;

/// Kind of asset queue.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Style,
    Script,
}

/// Script output pass.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptGroup {
    /// Head pass: footer scripts stay pending.
    Head,
    /// Footer pass.
    Footer,
    /// Everything in one pass.
    All,
}

/// What the producer needs from the site configuration.
#[derive(Debug, Clone)]
pub struct ConcatSettings {
    /// Site URL without a trailing `/`.
    pub site_url: String,
    /// Document root of the concat endpoint.
    pub root: PathBuf,
    pub static_prefix: String,
    pub allow_gzip_compression: bool,
    /// Most paths one concat URL may carry.
    pub max_files: usize,
    /// Site text direction is right-to-left.
    pub rtl: bool,
}

impl ConcatSettings {
    pub fn from_config(config: &ConcatConfig) -> Self {
        Self {
            site_url: config.site.base_url().to_string(),
            root: config.concat.root.clone(),
            static_prefix: config.concat.static_prefix.clone(),
            allow_gzip_compression: config.concat.allow_gzip_compression,
            max_files: config.concat.max_files,
            rtl: config.site.is_rtl(),
        }
    }

    /// Filter built from `site.exclude`.
    pub fn exclude_filter(config: &ConcatConfig) -> ExcludeList {
        ExcludeList::new(config.site.exclude.iter().cloned())
    }
}
