//! Data models for the ACS scatter plot.
//!
//! This module contains the core data structures used throughout
//! the application for representing yearly records, per-region
//! series and the size-encoding selection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One region's snapshot for one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearRecord {
    /// Survey year.
    pub year: i32,
    /// Region code (state FIPS).
    pub fips: String,
    /// Display name of the region.
    pub name: String,
    /// Median household income in USD.
    pub income: f64,
    /// Poverty rate in percent, NaN when the denominator is zero.
    pub poverty_rate: f64,
    /// Bachelor's-or-higher share in percent, NaN when unavailable.
    pub edu_pct: f64,
}

impl YearRecord {
    /// Creates a record without education data.
    pub fn new(year: i32, fips: String, name: String, income: f64, poverty_rate: f64) -> Self {
        Self {
            year,
            fips,
            name,
            income,
            poverty_rate,
            edu_pct: f64::NAN,
        }
    }

    /// Whether both plotted coordinates are finite.
    pub fn is_plottable(&self) -> bool {
        self.income.is_finite() && self.poverty_rate.is_finite()
    }
}

/// A single year's values inside a [`RegionSeries`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub year: i32,
    pub income: f64,
    pub poverty_rate: f64,
    pub edu_pct: f64,
}

impl From<&YearRecord> for SeriesPoint {
    fn from(record: &YearRecord) -> Self {
        Self {
            year: record.year,
            income: record.income,
            poverty_rate: record.poverty_rate,
            edu_pct: record.edu_pct,
        }
    }
}

/// One region's ordered time series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSeries {
    pub fips: String,
    pub name: String,
    /// Points sorted ascending by year.
    pub series: Vec<SeriesPoint>,
}

impl RegionSeries {
    /// Returns the first point recorded for `year`.
    pub fn point_for(&self, year: i32) -> Option<&SeriesPoint> {
        self.series.iter().find(|p| p.year == year)
    }
}

/// Region code to series. Ordered so that output is deterministic.
pub type Store = BTreeMap<String, RegionSeries>;

/// A region's values for the year currently on screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleRecord {
    pub fips: String,
    pub name: String,
    pub year: i32,
    pub income: f64,
    pub poverty_rate: f64,
    pub edu_pct: f64,
}

impl VisibleRecord {
    pub fn from_point(series: &RegionSeries, point: &SeriesPoint) -> Self {
        Self {
            fips: series.fips.clone(),
            name: series.name.clone(),
            year: point.year,
            income: point.income,
            poverty_rate: point.poverty_rate,
            edu_pct: point.edu_pct,
        }
    }

    /// Returns the value a size encoding reads from this record.
    pub fn field(&self, field: SizeField) -> Option<f64> {
        match field {
            SizeField::None => None,
            SizeField::Income => Some(self.income),
            SizeField::Poverty => Some(self.poverty_rate),
            SizeField::Education => Some(self.edu_pct),
        }
    }
}

/// Field mapped to mark radius.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SizeField {
    /// Uniform radius
    #[default]
    None,
    /// Median household income
    Income,
    /// Poverty rate
    Poverty,
    /// Bachelor's-or-higher share
    Education,
}

impl fmt::Display for SizeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeField::None => write!(f, "none"),
            SizeField::Income => write!(f, "income"),
            SizeField::Poverty => write!(f, "poverty"),
            SizeField::Education => write!(f, "education"),
        }
    }
}

impl FromStr for SizeField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(SizeField::None),
            "income" => Ok(SizeField::Income),
            "poverty" | "povertyrate" | "poverty_rate" => Ok(SizeField::Poverty),
            "education" | "edu" | "edupct" => Ok(SizeField::Education),
            other => Err(format!("unknown size field: {}", other)),
        }
    }
}

/// Outcome of loading a single year.
#[derive(Debug, Clone, Default, Serialize)]
pub struct YearOutcome {
    pub year: i32,
    /// Records that survived the finiteness filter.
    #[serde(skip)]
    pub records: Vec<YearRecord>,
    /// Whether education values were merged for this year.
    pub education_merged: bool,
    /// Base fetch error, if the year contributed nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl YearOutcome {
    pub fn failed(year: i32, error: String) -> Self {
        Self {
            year,
            records: Vec::new(),
            education_merged: false,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
