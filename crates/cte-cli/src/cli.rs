//! CLI argument definitions for the trials explorer.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use cte_client::SearchType;
use cte_model::CaseStrength;
use cte_cli::export::DEFAULT_TABLE;

#[derive(Parser)]
#[command(
    name = "trials-explorer",
    version,
    about = "Clinical trials explorer - search studies and visualize reported outcomes",
    long_about = "Search a clinical trials registry API, open study records, chart \
                  their reported outcome measures and compare completion rates.\n\n\
                  Talks to the explorer's REST API (see --api-url)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Settings file (default: platform config directory).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// API base URL (overrides the settings file).
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Output format for command results.
    #[arg(long = "format", value_enum, default_value = "table", global = true)]
    pub format: OutputFormatArg,

    /// Print the activity log after the command.
    #[arg(long = "show-log", global = true)]
    pub show_log: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Search studies.
    Search(SearchArgs),

    /// Show one study with its outcome visualizations.
    Study(StudyArgs),

    /// Render outcome visualizations from a saved study JSON file.
    Outcomes(OutcomesArgs),

    /// Registry-wide status, phase and enrollment statistics.
    Stats,

    /// Compare completed studies with studies that posted results.
    SuccessRates(SuccessRateArgs),

    /// Browse the biomarker approval precedent library.
    Precedents(PrecedentArgs),

    /// Export a SQLite warning-letter table to JSON.
    ExportWarningLetters(ExportArgs),

    /// Show the effective settings, optionally writing them to disk.
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct SearchArgs {
    /// Search term (optional for plain text searches).
    #[arg(value_name = "TERM", default_value = "")]
    pub term: String,

    /// Field the term is matched against
    /// (term, cond, intr, spons, locn, patient, id).
    #[arg(long = "type", short = 't', value_name = "TYPE", default_value = "term")]
    pub search_type: SearchType,

    /// Phase filter, e.g. PHASE3.
    #[arg(long = "phase")]
    pub phase: Option<String>,

    /// Overall status filter, e.g. RECRUITING.
    #[arg(long = "status")]
    pub status: Option<String>,

    /// Sort order passed to the registry, e.g. LastUpdatePostDate:desc.
    #[arg(long = "sort")]
    pub sort: Option<String>,

    /// Only studies with (true) or without (false) posted results.
    #[arg(long = "has-results", value_name = "BOOL")]
    pub has_results: Option<bool>,

    /// Registry query-language expression.
    #[arg(long = "advanced", value_name = "EXPR")]
    pub advanced: Option<String>,

    /// Comma-separated field selector.
    #[arg(long = "fields")]
    pub fields: Option<String>,

    /// Page to show (pages are reached by following page tokens).
    #[arg(long = "page", default_value_t = 1)]
    pub page: u64,

    /// Results per page (default: from settings).
    #[arg(long = "page-size")]
    pub page_size: Option<u64>,

    /// Fetch every page instead of one.
    #[arg(long = "all")]
    pub all: bool,

    /// Also write the result rows to a CSV file.
    #[arg(long = "csv", value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

#[derive(Args)]
pub struct StudyArgs {
    /// NCT identifier, e.g. NCT01234567.
    #[arg(value_name = "NCT_ID")]
    pub nct_id: String,
}

#[derive(Args)]
pub struct OutcomesArgs {
    /// Study JSON, bare or wrapped in a {success, data} envelope.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Args)]
pub struct SuccessRateArgs {
    #[arg(long = "condition")]
    pub condition: Option<String>,

    #[arg(long = "intervention")]
    pub intervention: Option<String>,

    #[arg(long = "phase")]
    pub phase: Option<String>,
}

#[derive(Args)]
pub struct PrecedentArgs {
    /// Review division (exact match).
    #[arg(long = "division")]
    pub division: Option<String>,

    #[arg(long = "biomarker")]
    pub biomarker: Option<String>,

    #[arg(long = "drug")]
    pub drug: Option<String>,

    #[arg(long = "fda-section")]
    pub fda_section: Option<String>,

    /// Case strength (moderate, strong, excellent, bulletproof).
    #[arg(long = "strength")]
    pub strength: Option<CaseStrength>,

    /// Replace the embedded dataset with a JSON file.
    #[arg(long = "dataset", value_name = "PATH")]
    pub dataset: Option<PathBuf>,
}

#[derive(Args)]
pub struct ExportArgs {
    /// SQLite database to read.
    #[arg(long = "db", value_name = "PATH")]
    pub db: PathBuf,

    /// JSON file to write.
    #[arg(long = "out", value_name = "PATH")]
    pub out: PathBuf,

    /// Table to export.
    #[arg(long = "table", default_value = DEFAULT_TABLE)]
    pub table: String,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the effective settings to the settings file.
    #[arg(long = "init")]
    pub init: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
