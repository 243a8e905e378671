//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.acsplot.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = ".acsplot.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Census API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Year range settings.
    #[serde(default)]
    pub years: YearsConfig,

    /// Chart layout settings.
    #[serde(default)]
    pub chart: ChartConfig,

    /// Autoplay settings.
    #[serde(default)]
    pub playback: PlaybackConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "frames".to_string()
}

/// Census API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, the year is appended as a path segment.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Dataset path after the year.
    #[serde(default = "default_dataset")]
    pub dataset: String,

    /// Geography selector passed as `for=`.
    #[serde(default = "default_geography")]
    pub geography: String,

    /// First year for which education variables are requested.
    #[serde(default = "default_education_start_year")]
    pub education_start_year: i32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            dataset: default_dataset(),
            geography: default_geography(),
            education_start_year: default_education_start_year(),
        }
    }
}

impl ApiConfig {
    /// Column holding the region code, e.g. `state` for `state:*`.
    pub fn region_column(&self) -> &str {
        self.geography
            .split(':')
            .next()
            .unwrap_or(&self.geography)
    }
}

fn default_base_url() -> String {
    "https://api.census.gov/data".to_string()
}

fn default_dataset() -> String {
    "acs/acs5".to_string()
}

fn default_geography() -> String {
    "state:*".to_string()
}

fn default_education_start_year() -> i32 {
    // B15003 is not published for the 2010 and 2011 5-year releases
    2012
}

/// Year range settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearsConfig {
    /// First year (inclusive).
    #[serde(default = "default_start_year")]
    pub start: i32,

    /// Last year (inclusive).
    #[serde(default = "default_end_year")]
    pub end: i32,
}

impl Default for YearsConfig {
    fn default() -> Self {
        Self {
            start: default_start_year(),
            end: default_end_year(),
        }
    }
}

impl YearsConfig {
    /// All years in the configured range.
    pub fn range(&self) -> Vec<i32> {
        (self.start..=self.end).collect()
    }
}

fn default_start_year() -> i32 {
    2010
}

fn default_end_year() -> i32 {
    2023
}

/// Chart layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// View box width.
    #[serde(default = "default_width")]
    pub width: f64,

    /// View box height.
    #[serde(default = "default_height")]
    pub height: f64,

    /// Margins reserved for axes and labels.
    #[serde(default)]
    pub margin: Margin,

    /// Radius range of the size encoding.
    #[serde(default = "default_radius_range")]
    pub radius_range: [f64; 2],

    /// Radius used without a size encoding.
    #[serde(default = "default_radius")]
    pub default_radius: f64,

    /// Duration of mark transitions in milliseconds.
    #[serde(default = "default_transition_ms")]
    pub transition_ms: u64,

    /// Mark fill color.
    #[serde(default = "default_fill")]
    pub fill: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            margin: Margin::default(),
            radius_range: default_radius_range(),
            default_radius: default_radius(),
            transition_ms: default_transition_ms(),
            fill: default_fill(),
        }
    }
}

impl ChartConfig {
    /// Width of the plotting area inside the margins.
    pub fn inner_width(&self) -> f64 {
        self.width - self.margin.left - self.margin.right
    }

    /// Height of the plotting area inside the margins.
    pub fn inner_height(&self) -> f64 {
        self.height - self.margin.top - self.margin.bottom
    }
}

/// Chart margins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 24.0,
            right: 24.0,
            bottom: 80.0,
            left: 72.0,
        }
    }
}

fn default_width() -> f64 {
    1040.0
}

fn default_height() -> f64 {
    520.0
}

fn default_radius_range() -> [f64; 2] {
    [3.0, 10.0]
}

fn default_radius() -> f64 {
    5.0
}

fn default_transition_ms() -> u64 {
    500
}

fn default_fill() -> String {
    "#2b7cff".to_string()
}

/// Autoplay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Interval between autoplay ticks in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_interval_ms() -> u64 {
    900
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from `dir/.acsplot.toml`.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only explicitly provided values override.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(start) = args.start_year {
            self.years.start = start;
        }
        if let Some(end) = args.end_year {
            self.years.end = end;
        }
        if let Some(ref url) = args.api_url {
            self.api.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(interval) = args.interval_ms {
            self.playback.interval_ms = interval;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Check cross-field constraints after merging.
    pub fn validate(&self) -> Result<()> {
        if self.years.start > self.years.end {
            anyhow::bail!(
                "Start year {} is after end year {}",
                self.years.start,
                self.years.end
            );
        }
        if self.chart.inner_width() <= 0.0 || self.chart.inner_height() <= 0.0 {
            anyhow::bail!("Chart margins leave no room for the plot");
        }
        if self.playback.interval_ms == 0 {
            anyhow::bail!("Playback interval must be at least 1ms");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
