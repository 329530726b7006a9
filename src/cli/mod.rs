//! CLI command definitions for stream-config
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod resolve;
pub mod schema;

use crate::config::Config;
use crate::schema::ProfileName;
use anyhow::Context;
use clap::{Parser, Subcommand};
use resolve::ResolveArgs;
use schema::SchemaArgs;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Layered configuration resolver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to settings file (bypasses the settings tiers)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Root folder where fragments are found (overrides settings)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Built-in profile (overrides settings)
    #[arg(short, long, global = true, value_enum)]
    pub profile: Option<ProfileName>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge the layers for a topic and print the resolved record
    Resolve(ResolveArgs),

    /// Write the JSON schema for fragment files
    Schema(SchemaArgs),
}

impl Cli {
    /// Apply global flag overrides to loaded settings.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(ref root) = self.root {
            config.engine.root = root.clone();
        }
        if let Some(profile) = self.profile {
            config.engine.profile = profile;
        }
    }
}

/// Write `value` as pretty JSON, creating parent directories.
pub fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolve() {
        let cli = Cli::try_parse_from([
            "stream-config",
            "--root",
            "/srv/configs",
            "resolve",
            "--topic",
            "Hades",
            "--on-call",
        ])
        .unwrap();

        let Command::Resolve(ref args) = cli.command else {
            panic!("expected resolve");
        };
        assert_eq!(args.topic, "Hades");
        assert!(args.on_call);
        assert_eq!(cli.log, "2");

        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.engine.root, PathBuf::from("/srv/configs"));
    }

    #[test]
    fn test_resolve_requires_topic() {
        assert!(Cli::try_parse_from(["stream-config", "resolve"]).is_err());
    }

    #[test]
    fn test_profile_override() {
        let cli = Cli::try_parse_from(["stream-config", "schema", "--profile", "model"]).unwrap();
        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.engine.profile, ProfileName::Model);

        // Unknown profiles are rejected while parsing
        assert!(Cli::try_parse_from(["stream-config", "schema", "-p", "bot"]).is_err());
    }
}
