//! Configuration management for `concat.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── concat     # [concat]
//! │   ├── serve      # [serve]
//! │   └── site       # [site]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   ├── field      # FieldPath
//! │   └── handle     # Global config handle
//! └── mod.rs         # ConcatConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section     | Purpose                                           |
//! |-------------|---------------------------------------------------|
//! | `[concat]`  | Document root, file limit, MIME types, minifiers  |
//! | `[serve]`   | HTTP endpoint (interface, port, threads)          |
//! | `[site]`    | Base URL and tag settings for the asset producer  |

pub mod section;
pub mod types;

pub use section::{ConcatSectionConfig, DEFAULT_MAX_FILES, ServeConfig, SiteSectionConfig};

pub use types::{ConfigDiagnostics, ConfigError, FieldPath, cfg, init_config};

use crate::{
    cli::{Cli, Commands},
    log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing concat.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConcatConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Concatenation engine settings
    #[serde(default)]
    pub concat: ConcatSectionConfig,

    /// HTTP server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Asset producer settings
    #[serde(default)]
    pub site: SiteSectionConfig,
}

impl ConcatConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. A missing file is not an
    /// error: defaults apply and relative paths resolve against cwd.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = path;
                config
            }
            None => {
                crate::debug!("config"; "{} not found, using defaults", cli.config.display());
                Self {
                    config_path: cwd.join(&cli.config),
                    ..Self::default()
                }
            }
        };

        config.finalize(cli, &cwd);
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {field}");
        }
    }

    /// Directory holding the config file; relative paths resolve against it.
    pub fn config_dir(&self) -> &Path {
        self.config_path.parent().unwrap_or(Path::new(""))
    }

    /// Document root of the concat endpoint.
    pub fn root(&self) -> &Path {
        &self.concat.root
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Finalize configuration after loading.
    fn finalize(&mut self, cli: &Cli, cwd: &Path) {
        crate::logger::set_verbose(cli.verbose);

        // Paths given on the command line are relative to cwd, paths in the
        // file are relative to the file.
        let root = match cli.root_override() {
            Some(root) => cwd.join(root),
            None => self.config_dir().join(&self.concat.root),
        };
        self.concat.root = crate::utils::path::normalize_path(&root);
        self.config_path = crate::utils::path::normalize_path(&self.config_path);

        self.apply_command_options(cli);

        if self.site.url.is_none() {
            self.site.url = Some(format!(
                "http://{}:{}",
                self.serve.interface, self.serve.port
            ));
        }
    }

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        if let Commands::Serve {
            interface, port, ..
        } = &cli.command
        {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.concat.validate(&mut diag);
        self.serve.validate(&mut diag);
        self.site.validate(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// config discovery
// ============================================================================

/// Find the config file, searching upward from the current directory.
///
/// ```text
/// /srv/site/public/css/   <- cwd
/// /srv/site/concat.toml   <- found
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_from(&cwd, config_name)
}

/// Walk up from `start` until `config_name` exists. Absolute names are only
/// checked as given.
fn find_config_from(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.is_file().then(|| config_name.to_path_buf());
    }
    start
        .ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config from TOML.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> ConcatConfig {
    let (parsed, ignored) = ConcatConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_str_invalid_toml() {
        let result = ConcatConfig::from_str("[concat\nroot = \"public\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_default() {
        let config = ConcatConfig::default();

        assert_eq!(config.config_path, PathBuf::new());
        assert_eq!(config.concat.max_files, DEFAULT_MAX_FILES);
        assert_eq!(config.serve.port, 5280);
        assert!(config.site.url.is_none());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[concat]\nmax_files = 10\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = ConcatConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.concat.max_files, 10);
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_no_unknown_fields() {
        let content = "[concat]\nroot = \"public\"\n[serve]\nport = 1";
        let (_, ignored) = ConcatConfig::parse_with_ignored(content).unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_finalize_resolves_root_and_site_url() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::create_dir(dir.path().join("public")).unwrap();

        let mut config = test_parse_config("[concat]\nroot = \"public\"");
        config.config_path = dir.path().join("concat.toml");

        let cli = Cli::parse_from(["http-concat", "serve", "-p", "9000"]);
        config.finalize(&cli, Path::new("/unused"));

        assert!(config.root().ends_with("public"));
        assert!(config.root().is_absolute());
        assert_eq!(config.serve.port, 9000);
        assert_eq!(config.site.url.as_deref(), Some("http://127.0.0.1:9000"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_finalize_cli_root_relative_to_cwd() {
        let dir = tempfile::TempDir::new().unwrap();

        let mut config = ConcatConfig {
            config_path: PathBuf::from("/elsewhere/concat.toml"),
            ..ConcatConfig::default()
        };
        let cli = Cli::parse_from(["http-concat", "serve", "--root", "www"]);
        config.finalize(&cli, dir.path());

        assert_eq!(config.root(), dir.path().join("www"));
    }

    #[test]
    fn test_find_config_walks_up() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("public/css");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("concat.toml"), "[concat]\nroot = \"public\"").unwrap();

        let found = find_config_from(&nested, Path::new("concat.toml")).unwrap();
        assert_eq!(found, dir.path().join("concat.toml"));

        let config = ConcatConfig::from_path(&found).unwrap();
        assert_eq!(config.concat.root, PathBuf::from("public"));
    }

    #[test]
    fn test_find_config_absolute_and_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("site.toml");
        assert_eq!(find_config_from(dir.path(), &path), None);

        fs::write(&path, "").unwrap();
        assert_eq!(find_config_from(Path::new("/"), &path), Some(path.clone()));
        assert_eq!(find_config_from(dir.path(), Path::new("missing-concat.toml")), None);

        // a directory with the config's name is not a config file
        fs::create_dir(dir.path().join("concat.toml")).unwrap();
        assert_eq!(find_config_from(dir.path(), Path::new("concat.toml")), None);
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut config = test_parse_config(
            "[concat]\nmax_files = 0\nstatic_prefix = \"x\"\n[serve]\nthreads = 0",
        );
        config.concat.root = PathBuf::from("/definitely/not/here");

        let err = config.validate().unwrap_err();
        let Some(ConfigError::Diagnostics(diag)) = err.downcast_ref::<ConfigError>() else {
            panic!("expected diagnostics, got {err}");
        };
        assert_eq!(diag.errors().len(), 4);
    }
}
