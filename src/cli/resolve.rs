//! Resolve subcommand.
//!
//! Merges the layers for one topic, writes the result to the output file,
//! and prints it as a single JSON line on stdout.

use super::write_json_file;
use crate::calendar::CalendarTokens;
use crate::config::Config;
use crate::engine::{Engine, ResolveRequest, Resolved};
use crate::error::DiagnosticCode;
use crate::source::DirSource;
use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

/// Arguments for the resolve subcommand
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// The topic we are looking up (game name or model file)
    #[arg(short, long)]
    pub topic: String,

    /// Manually set the weekday token for testing (e.g. Saturday)
    #[arg(long, value_name = "DAY")]
    pub day_override: Option<String>,

    /// Manually set the date token for testing (e.g. December-25)
    #[arg(long, value_name = "DATE")]
    pub date_override: Option<String>,

    /// Resolve as if today were this date (YYYY-MM-DD)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub on: Option<NaiveDate>,

    /// Force a mode, replacing whatever the layers chose
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Disable interruptions for an on-call stream
    #[arg(long)]
    pub on_call: bool,

    /// Output file path (overrides settings)
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Skip writing the output file; stdout only
    #[arg(long)]
    pub no_write_file: bool,

    /// Print diagnostics as JSON on stderr
    #[arg(long)]
    pub diagnostics: bool,
}

impl ResolveArgs {
    pub fn calendar(&self) -> CalendarTokens {
        let base = match self.on {
            Some(date) => CalendarTokens::for_date(date),
            None => CalendarTokens::today(),
        };
        base.with_overrides(self.day_override.as_deref(), self.date_override.as_deref())
    }

    pub fn request(&self) -> ResolveRequest {
        let mut request = ResolveRequest::new(&self.topic, self.calendar()).on_call(self.on_call);
        if let Some(ref mode) = self.mode {
            request = request.with_mode(mode);
        }
        request
    }
}

/// Resolve the requested topic using `config`.
pub fn run_resolve(config: &Config, args: &ResolveArgs) -> Result<Resolved> {
    let engine = Engine::new(config.engine.profile()?, config.engine.settings());
    let source = DirSource::new(&config.engine.root, engine.profile().layout.clone());

    debug!("Reading configs...");
    let resolved = engine.resolve(&source, &args.request())?;
    summarize(&resolved);

    if config.output.write_file && !args.no_write_file {
        let path = args.out.as_ref().unwrap_or(&config.output.path);
        debug!(path = %path.display(), "Writing JSON file...");
        write_json_file(path, &resolved.record)?;
    }

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer(&mut stdout, &resolved.record)?;
    writeln!(stdout)?;

    if args.diagnostics {
        eprintln!("{}", serde_json::to_string_pretty(&resolved.diagnostics)?);
    }

    Ok(resolved)
}

fn summarize(resolved: &Resolved) {
    let absent = resolved
        .diagnostics
        .iter()
        .filter(|d| d.code == DiagnosticCode::SourceAbsent)
        .count();
    let other = resolved.diagnostics.len() - absent;
    info!(
        topic_found = resolved.topic_found,
        absent_layers = absent,
        warnings = other,
        "Resolved configs"
    );
}
