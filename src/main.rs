//! http-concat - compact-query CSS/JS concatenation server and tag builder.

mod cli;
mod concat;
mod config;
mod logger;
mod producer;
mod utils;

use anyhow::{Result, bail};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use concat::ConcatRequest;
use config::{ConcatConfig, init_config};
use producer::{AssetConcat, AssetKind, ConcatSettings, Manifest, ScriptGroup, href};
use std::path::Path;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    cli::serve::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = init_config(ConcatConfig::load(&cli)?);

    match &cli.command {
        Commands::Serve { .. } => cli::serve::serve(),
        Commands::Href { script, paths } => {
            let settings = ConcatSettings::from_config(&config);
            let suffix = if *script { "j" } else { "" };
            for url in href::batch_hrefs(&settings, paths, suffix) {
                println!("{url}");
            }
            Ok(())
        }
        Commands::Tags {
            manifest,
            kind,
            group,
        } => print_tags(&config, manifest, *kind, *group),
        Commands::Decode { uri } => decode_uri(&config, uri),
    }
}

/// Print the tags one queue of a manifest produces.
fn print_tags(config: &ConcatConfig, manifest: &Path, kind: AssetKind, group: ScriptGroup) -> Result<()> {
    let settings = ConcatSettings::from_config(config);
    let filter = ConcatSettings::exclude_filter(config);
    let mut registry = Manifest::from_path(manifest)?.registry(kind);

    let output = {
        let mut concat = AssetConcat::new(&mut registry, &settings, &filter);
        match kind {
            AssetKind::Style => concat.do_styles(None),
            AssetKind::Script => concat.do_scripts(None, group),
        }
    };
    debug!(
        "tags";
        "{} printed, {} left for the footer",
        registry.done().len(),
        registry.in_footer().len()
    );
    print!("{output}");
    Ok(())
}

/// Print the decoded form of a request URI.
fn decode_uri(config: &ConcatConfig, uri: &str) -> Result<()> {
    match ConcatRequest::decode(uri, &config.concat.static_prefix, config.concat.max_files) {
        Ok(request) => {
            println!("{}", serde_json::to_string_pretty(&request)?);
            Ok(())
        }
        Err(e) => bail!("{} {}", e.status(), e),
    }
}
