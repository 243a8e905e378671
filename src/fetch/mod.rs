//! Census API access and per-year loading.
//!
//! This module fetches the base and education tables for each year,
//! joins them by region code and isolates failures per year.

pub mod client;
pub mod loader;
pub mod table;

pub use client::CensusClient;
pub use loader::{flatten, load_years, LoadOptions};

use thiserror::Error;

/// Errors raised while fetching or parsing one table.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Body is not a JSON array of string rows
    #[error("malformed table: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response without a header row
    #[error("empty table")]
    EmptyTable,

    /// Header lacks a required variable
    #[error("missing column: {0}")]
    MissingColumn(String),
}
