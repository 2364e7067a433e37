//! Asset manifest loading.
//!
//! # Example
//!
//! ```toml
//! [styles]
//! queue = ["theme"]
//!
//! [[styles.assets]]
//! handle = "theme"
//! src = "/wp-content/themes/t/style.css"
//! deps = ["reset"]
//! media = "screen"
//!
//! [scripts]
//! queue = ["app"]
//!
//! [[scripts.assets]]
//! handle = "app"
//! src = "/js/app.js"
//! footer = true
//! ```

use super::{Asset, AssetKind, AssetRegistry};
use crate::config::ConfigError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

/// Registered assets and queue of one kind.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueueManifest {
    pub queue: Vec<String>,
    pub assets: Vec<Asset>,
}

impl QueueManifest {
    pub fn into_registry(self) -> AssetRegistry {
        let mut registry = AssetRegistry::new();
        for asset in self.assets {
            registry.register(asset);
        }
        for handle in self.queue {
            registry.enqueue(handle);
        }
        registry
    }
}

/// Stylesheet and script queues.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    pub styles: QueueManifest,
    pub scripts: QueueManifest,
}

impl Manifest {
    pub fn from_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content).map_err(ConfigError::Toml)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
            .with_context(|| format!("invalid asset manifest `{}`", path.display()))
    }

    /// Registry for one asset kind.
    pub fn registry(self, kind: AssetKind) -> AssetRegistry {
        match kind {
            AssetKind::Style => self.styles.into_registry(),
            AssetKind::Script => self.scripts.into_registry(),
        }
    }
}
