//! Configuration section definitions.
//!
//! Each module corresponds to a section in `concat.toml`:
//!
//! | Module   | TOML Section | Purpose                               |
//! |----------|--------------|---------------------------------------|
//! | `concat` | `[concat]`   | Document root, limits, types, minify  |
//! | `serve`  | `[serve]`    | HTTP server                           |
//! | `site`   | `[site]`     | Site URL and asset tag settings       |

mod concat;
mod serve;
mod site;

pub use concat::{ConcatSectionConfig, DEFAULT_MAX_FILES};
pub use serve::ServeConfig;
pub use site::SiteSectionConfig;
