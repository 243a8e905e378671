//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::SizeField;
use clap::Parser;
use std::path::PathBuf;

/// acsplot - income vs. poverty scatter plot from Census ACS data
///
/// Fetches the ACS 5-year estimates for every year in range, builds
/// per-state time series and renders them as SVG frames, or runs an
/// interactive session with a year scrubber and autoplay.
///
/// Examples:
///   acsplot
///   acsplot --start-year 2015 --end-year 2022 -o frames/
///   acsplot --format json -o store.json
///   acsplot --interactive --size-by education -o live.svg
///   acsplot --dry-run
///   acsplot --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// First year to fetch (inclusive)
    #[arg(long, value_name = "YEAR", env = "ACSPLOT_START_YEAR")]
    pub start_year: Option<i32>,

    /// Last year to fetch (inclusive)
    #[arg(long, value_name = "YEAR", env = "ACSPLOT_END_YEAR")]
    pub end_year: Option<i32>,

    /// Census data API base URL
    ///
    /// The year and dataset are appended as path segments.
    #[arg(long, value_name = "URL", env = "ACSPLOT_API_URL")]
    pub api_url: Option<String>,

    /// Output path
    ///
    /// A directory of per-year frames for svg, a file for json and
    /// markdown, and the live frame file in interactive mode.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output format (svg, json, markdown)
    #[arg(long, default_value = "svg", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Field mapped to point size
    #[arg(long, default_value = "none", value_name = "FIELD")]
    pub size_by: SizeField,

    /// Run an interactive session reading commands from stdin
    #[arg(short, long)]
    pub interactive: bool,

    /// Autoplay interval in milliseconds
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .acsplot.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the request URLs without fetching anything
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .acsplot.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for non-interactive runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One SVG frame per year (default)
    #[default]
    Svg,
    /// Per-region series as JSON
    Json,
    /// Load summary as Markdown
    Markdown,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let (Some(start), Some(end)) = (self.start_year, self.end_year) {
            if start > end {
                return Err(format!(
                    "Start year {} must not be after end year {}",
                    start, end
                ));
            }
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.interval_ms == Some(0) {
            return Err("Interval must be at least 1ms".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        self.log_level_with(false)
    }

    /// Log level once the config file's `verbose` setting is known.
    ///
    /// `--quiet` still wins over a verbose config.
    pub fn log_level_with(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
