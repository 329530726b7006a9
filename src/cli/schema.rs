//! Schema subcommand for editors and validators.

use super::write_json_file;
use crate::config::Config;
use crate::schema::json_schema;
use anyhow::Result;
use clap::Args;
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

/// Arguments for the schema subcommand
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Output file path (default: settings `output.schema_path`; `-` for stdout)
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

/// Generate the fragment schema for the configured profile and write it.
pub fn run_schema(config: &Config, args: &SchemaArgs) -> Result<Value> {
    let profile = config.engine.profile()?;
    let doc = json_schema(&profile.schema);

    let path = args.out.as_ref().unwrap_or(&config.output.schema_path);
    if path.as_os_str() == "-" {
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        debug!(path = %path.display(), profile = %profile.name, "Writing schema file...");
        write_json_file(path, &doc)?;
    }

    Ok(doc)
}
