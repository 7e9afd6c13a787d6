//! CLI argument parsing for schedtally

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

/// Output format for the summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text format (default)
    #[default]
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

/// What to do with a line that has fewer than 3 tab-separated fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Stop the run with an error (default)
    #[default]
    Abort,
    /// Log a warning, count the line, and continue
    Skip,
}

#[derive(Parser, Debug)]
#[command(name = "schedtally")]
#[command(version)]
#[command(about = "Deduplicate a tab-delimited schedule and count sections per subject", long_about = None)]
pub struct Cli {
    /// Schedule file to read [default: dvc-schedule.txt]
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// File that receives one line per duplicate record (overwritten) [default: duplicates.txt]
    #[arg(short = 'd', long = "duplicates", value_name = "FILE")]
    pub duplicates: Option<PathBuf>,

    /// Output format for the summary [default: text]
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Policy for lines with fewer than 3 fields [default: abort]
    #[arg(long = "on-malformed", value_enum, value_name = "POLICY")]
    pub on_malformed: Option<MalformedPolicy>,

    /// Only print these subjects (e.g., -e subject=MATH,PHYS or -e subject=/^COM/)
    #[arg(short = 'e', long = "expr", value_name = "EXPR")]
    pub filter: Option<String>,

    /// Discard the first line of the input as a header
    #[arg(long = "skip-header")]
    pub skip_header: bool,

    /// Count by full subject-and-section field instead of the subject prefix
    #[arg(long = "by-section")]
    pub by_section: bool,

    /// Also write INSERTING lines for canonical records to the duplicates file
    #[arg(long = "log-inserts")]
    pub log_inserts: bool,

    /// Print section/subject totals and run time to stderr
    #[arg(long = "extended")]
    pub extended: bool,

    /// Load defaults from a TOML configuration file
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug tracing on stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
