//! `[site]` section configuration.
//!
//! Used when building tags and URLs for an asset queue.
//!
//! # Example
//!
//! ```toml
//! [site]
//! url = "https://example.com/blog"  # Base URL assets are resolved against
//! text_direction = "ltr"            # "rtl" keeps RTL stylesheets out of batches
//! exclude = ["admin-bar"]           # Handles that are never concatenated
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

/// Site settings for the asset tag builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSectionConfig {
    /// Base URL of the site. Defaults to the serve address.
    pub url: Option<String>,

    /// Text direction of the site (`ltr` or `rtl`).
    pub text_direction: String,

    /// Asset handles excluded from concatenation.
    pub exclude: Vec<String>,
}

impl Default for SiteSectionConfig {
    fn default() -> Self {
        Self {
            url: None,
            text_direction: "ltr".into(),
            exclude: Vec::new(),
        }
    }
}

impl SiteSectionConfig {
    /// Site URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.as_deref().unwrap_or_default().trim_end_matches('/')
    }

    pub fn is_rtl(&self) -> bool {
        self.text_direction.eq_ignore_ascii_case("rtl")
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if let Some(url) = &self.url
            && url::Url::parse(url).is_err()
        {
            diag.error_with_hint(
                FieldPath::new("site.url"),
                format!("`{url}` is not a valid URL"),
                "use an absolute URL such as \"https://example.com\"",
            );
        }

        if !matches!(self.text_direction.to_ascii_lowercase().as_str(), "ltr" | "rtl") {
            diag.error(
                FieldPath::new("site.text_direction"),
                format!("expected \"ltr\" or \"rtl\", got \"{}\"", self.text_direction),
            );
        }
    }
}
