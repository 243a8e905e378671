//! Load summary and store export.
//!
//! This module generates the Markdown load summary and the JSON dump
//! of the per-region series.

use crate::analysis::{regions_per_year, Domains};
use crate::models::{Store, YearOutcome};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything the summary reports on.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub years: Vec<YearOutcome>,
    pub regions: usize,
    pub records: usize,
    pub income_domain: Option<[f64; 2]>,
    pub poverty_domain: Option<[f64; 2]>,
    pub duration_seconds: f64,
}

impl LoadReport {
    pub fn new(
        source: String,
        years: Vec<YearOutcome>,
        store: &Store,
        domains: Option<&Domains>,
        duration_seconds: f64,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            source,
            years,
            regions: store.len(),
            records: store.values().map(|r| r.series.len()).sum(),
            income_domain: domains.map(|d| d.x.domain()),
            poverty_domain: domains.map(|d| d.y.domain()),
            duration_seconds,
        }
    }

    pub fn failed_years(&self) -> Vec<i32> {
        self.years
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| o.year)
            .collect()
    }
}

/// Generate the Markdown load summary.
pub fn generate_markdown_summary(report: &LoadReport, store: &Store) -> String {
    let mut output = String::new();

    output.push_str("# ACS Load Summary\n\n");

    output.push_str("## Metadata\n\n");
    output.push_str(&format!("- **Source:** {}\n", report.source));
    output.push_str(&format!(
        "- **Generated:** {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("- **Regions:** {}\n", report.regions));
    output.push_str(&format!("- **Records:** {}\n", report.records));
    output.push_str(&format!(
        "- **Load Duration:** {:.1}s\n\n",
        report.duration_seconds
    ));

    output.push_str(&generate_years_section(report, store));
    output.push_str(&generate_domains_section(report));

    output.push_str("---\n\n");
    output.push_str("*Generated by acsplot*\n");

    output
}

fn generate_years_section(report: &LoadReport, store: &Store) -> String {
    let mut section = String::new();

    section.push_str("## Years\n\n");
    section.push_str("| Year | Regions | Education | Status |\n");
    section.push_str("|:---:|:---:|:---:|:---|\n");

    let counts = regions_per_year(store);
    for outcome in &report.years {
        let regions = counts
            .iter()
            .find(|(year, _)| *year == outcome.year)
            .map(|(_, n)| *n)
            .unwrap_or(0);
        let education = if outcome.education_merged { "yes" } else { "no" };
        let status = match &outcome.error {
            Some(e) => format!("failed: {}", e.replace('|', "\\|")),
            None => "ok".to_string(),
        };
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            outcome.year, regions, education, status
        ));
    }
    section.push('\n');

    let failed = report.failed_years();
    if !failed.is_empty() {
        let list: Vec<String> = failed.iter().map(i32::to_string).collect();
        section.push_str(&format!(
            "{} year(s) contributed no data: {}\n\n",
            failed.len(),
            list.join(", ")
        ));
    }

    section
}

fn generate_domains_section(report: &LoadReport) -> String {
    let mut section = String::new();

    section.push_str("## Axes\n\n");
    match (report.income_domain, report.poverty_domain) {
        (Some(x), Some(y)) => {
            section.push_str(&format!("- **Income:** ${} to ${}\n", x[0], x[1]));
            section.push_str(&format!("- **Poverty rate:** {}% to {}%\n\n", y[0], y[1]));
        }
        _ => section.push_str("No finite income or poverty values; nothing to plot.\n\n"),
    }

    section
}

/// Serialize the store as pretty JSON.
pub fn generate_json_store(store: &Store) -> Result<String> {
    let regions: Vec<_> = store.values().collect();
    serde_json::to_string_pretty(&regions).map_err(Into::into)
}
