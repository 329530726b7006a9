//! stream-config
//!
//! Resolves the layered stream settings for a topic and writes them where
//! the streaming tools pick them up.

use anyhow::Result;
use clap::Parser;
use stream_config::cli::resolve::run_resolve;
use stream_config::cli::schema::run_schema;
use stream_config::cli::{Cli, Command};
use stream_config::config::{ConfigLoader, ConfigPaths};
use stream_config::logging::{self, LogTarget};
use tracing::{debug, info};

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut paths = ConfigPaths::discover();
    if let Some(ref config_path) = cli.config {
        paths = paths.with_explicit(config_path);
    }
    let loader = ConfigLoader::load_with_paths(paths)?;
    if let Some(path) = loader.config_path() {
        info!(path = %path.display(), "Loaded settings");
    }

    let mut config = loader.into_config();
    cli.apply_overrides(&mut config);
    debug!(
        root = %config.engine.root.display(),
        profile = %config.engine.profile,
        include_precedence = %config.engine.include_precedence,
        "Settings"
    );

    match cli.command {
        Command::Resolve(ref args) => {
            run_resolve(&config, args)?;
        }
        Command::Schema(ref args) => {
            run_schema(&config, args)?;
        }
    }

    debug!("End of Line.");
    Ok(())
}
