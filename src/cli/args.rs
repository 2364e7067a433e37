//! Command-line interface definitions.

use crate::producer::{AssetKind, ScriptGroup};
use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Compact-query CSS/JS concatenation server and tag builder
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: concat.toml)
    #[arg(short = 'C', long, global = true, default_value = "concat.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Document root (relative to current directory), overrides `concat.root`
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve concatenated resources over HTTP
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the concat URL for a batch of site-relative paths
    Href {
        /// Build a script batch (`?m=<mtime>j`) instead of a stylesheet batch
        #[arg(short, long)]
        script: bool,

        /// Site-relative paths, e.g. `/css/a.css`
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<String>,
    },

    /// Print the tags an asset manifest produces
    #[command(visible_alias = "t")]
    Tags {
        /// Asset manifest (TOML)
        #[arg(value_hint = clap::ValueHint::FilePath)]
        manifest: PathBuf,

        /// Which queue to print
        #[arg(short, long, value_enum, default_value_t = AssetKind::Style)]
        kind: AssetKind,

        /// Script group to print (ignored for styles)
        #[arg(short, long, value_enum, default_value_t = ScriptGroup::All)]
        group: ScriptGroup,
    },

    /// Decode a request URI into its resource list (JSON)
    #[command(visible_alias = "d")]
    Decode {
        /// Request URI, e.g. `/_static/??/a.css,/b.css?m=1`
        uri: String,
    },
}

impl Cli {
    /// Document root given on the command line, if any.
    pub fn root_override(&self) -> Option<&PathBuf> {
        self.root.as_ref()
    }
}
