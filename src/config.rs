//! Run configuration: TOML file defaults merged under CLI flags
//!
//! # Example schedtally.toml
//!
//! ```toml
//! input = "data/dvc-schedule.txt"
//! duplicates = "out/duplicates.txt"
//! format = "json"
//! on_malformed = "skip"
//! filter = "subject=/^COM/"
//! skip_header = true
//! ```
//!
//! Precedence: explicit CLI value, then the file, then built-in defaults.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::aggregator::AggregatorConfig;
use crate::cli::{Cli, MalformedPolicy, OutputFormat};
use crate::error::{AggregateError, FileAction, Result};
use crate::filter::SubjectFilter;
use crate::record::SubjectGrouping;

/// Input file used when none is given
pub const DEFAULT_INPUT: &str = "dvc-schedule.txt";
/// Duplicates side file used when none is given
pub const DEFAULT_DUPLICATES: &str = "duplicates.txt";

/// Contents of a schedtally.toml file; every key is optional
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub input: Option<PathBuf>,
    pub duplicates: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub on_malformed: Option<MalformedPolicy>,
    pub filter: Option<String>,
    pub skip_header: Option<bool>,
    pub by_section: Option<bool>,
    pub log_inserts: Option<bool>,
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| AggregateError::FileAccess {
            path: path.to_path_buf(),
            action: FileAction::Read,
            source,
        })?;

        Self::from_toml_str(&content)
            .map_err(|e| AggregateError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AggregateError::Config(e.to_string()))
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub input: PathBuf,
    pub duplicates: PathBuf,
    pub format: OutputFormat,
    pub filter: SubjectFilter,
    pub aggregator: AggregatorConfig,
    pub extended: bool,
}

impl RunSettings {
    /// Merge CLI arguments over an optional file configuration
    pub fn resolve(cli: &Cli, file: Option<FileConfig>) -> Result<Self> {
        let file = file.unwrap_or_default();

        let filter = match cli.filter.as_deref().or(file.filter.as_deref()) {
            Some(expr) => SubjectFilter::from_expr(expr)?,
            None => SubjectFilter::all(),
        };

        let grouping = if cli.by_section || file.by_section.unwrap_or(false) {
            SubjectGrouping::Section
        } else {
            SubjectGrouping::Subject
        };

        Ok(Self {
            input: cli
                .input
                .clone()
                .or(file.input)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT)),
            duplicates: cli
                .duplicates
                .clone()
                .or(file.duplicates)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DUPLICATES)),
            format: cli.format.or(file.format).unwrap_or_default(),
            filter,
            aggregator: AggregatorConfig {
                grouping,
                on_malformed: cli.on_malformed.or(file.on_malformed).unwrap_or_default(),
                skip_header: cli.skip_header || file.skip_header.unwrap_or(false),
                log_inserts: cli.log_inserts || file.log_inserts.unwrap_or(false),
            },
            extended: cli.extended,
        })
    }

    /// Resolve from the CLI, loading `--config` if given
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => Some(FileConfig::from_file(path)?),
            None => None,
        };
        Self::resolve(cli, file)
    }
}
