//! Command-line surface.
//!
//! ## Commands
//!
//! - `creditier export --out <DIR> [--config <FILE>] [--schema <S>] [--limit <N>] <INPUT>...`
//! - `creditier rules [--config <FILE>]`

use crate::assemble::{write_bundle, WrittenFile};
use crate::ingest::read_table;
use crate::settings::CliSettings;
use anyhow::Context;
use clap::{Parser, Subcommand};
use creditier_core::{ExportBundle, ExportPlan};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "creditier",
    version,
    about = "Classify credit-line records into risk tiers and export bounded CSV files"
)]
pub struct Cli {
    /// Log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rotating log files (stderr when omitted).
    #[arg(long = "log-dir", global = true)]
    pub log_dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify input files and write one CSV per tier segment.
    Export(ExportArgs),
    /// Print the effective rule sets as JSON.
    Rules(RulesArgs),
}

#[derive(Debug, Parser)]
pub struct ExportArgs {
    /// JSON configuration file.
    #[arg(long = "config", short = 'c')]
    pub config: Option<PathBuf>,

    /// Output directory for the generated files.
    #[arg(long = "out", short = 'o')]
    pub out_dir: PathBuf,

    /// Output schema override (identifier_only|identifier_and_credential|all_columns).
    #[arg(long = "schema", short = 's')]
    pub schema: Option<String>,

    /// Maximum rows per file override.
    #[arg(long = "limit", short = 'l', allow_negative_numbers = true)]
    pub limit: Option<i64>,

    /// Sort by available amount (ascending, blanks last) before classifying.
    #[arg(long = "sort-by-available")]
    pub sort_by_available: bool,

    /// Keep only the first row per identifier before classifying.
    #[arg(long = "dedup-ids")]
    pub dedup_ids: bool,

    /// Input CSV files; columns are unioned across files.
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct RulesArgs {
    /// JSON configuration file.
    #[arg(long = "config", short = 'c')]
    pub config: Option<PathBuf>,
}

/// Result of one `export` invocation.
#[derive(Debug)]
pub struct ExportOutcome {
    pub bundle: ExportBundle,
    pub files: Vec<WrittenFile>,
}

/// Loads settings, applies flag overrides, runs the engine and writes files.
pub fn run_export(args: &ExportArgs) -> anyhow::Result<ExportOutcome> {
    let mut settings = CliSettings::load(args.config.as_deref())?;
    if let Some(schema) = &args.schema {
        settings.export.schema = schema.clone();
    }
    if let Some(limit) = args.limit {
        settings.export.chunk_limit = limit;
    }
    settings.export.prepare.sort_by_available |= args.sort_by_available;
    settings.export.prepare.dedup_by_id |= args.dedup_ids;

    let plan = ExportPlan::from_config(&settings.export).context("invalid configuration")?;
    let table = read_table(&args.inputs, &settings.columns)?;
    let bundle = plan.run(&table).context("invalid input table")?;
    let files = write_bundle(&bundle, &args.out_dir)?;
    Ok(ExportOutcome { bundle, files })
}

/// Renders the effective rule strategy as pretty JSON.
pub fn render_rules(args: &RulesArgs) -> anyhow::Result<String> {
    let settings = CliSettings::load(args.config.as_deref())?;
    serde_json::to_string_pretty(&settings.export.rules).context("failed to render rules")
}

/// Human-readable report of an export run.
pub fn summarize(outcome: &ExportOutcome) -> String {
    let bundle = &outcome.bundle;
    let mut lines = vec![format!(
        "group={} family={} schema={} data_quality_warnings={}",
        bundle.group_label,
        bundle.family.as_str(),
        bundle.schema.as_str(),
        bundle.data_quality_warnings
    )];
    for tier in &bundle.tiers {
        let mut line = format!(
            "tier={} classified={} projected={} files={}",
            tier.name,
            tier.classified_rows,
            tier.projected_rows,
            tier.segments.len()
        );
        if let Some(gap) = &tier.gap {
            line.push_str(&format!(" missing={gap}"));
        }
        lines.push(line);
    }
    for file in &outcome.files {
        lines.push(format!("wrote {} ({} rows)", file.path.display(), file.rows));
    }
    lines.join("\n")
}
