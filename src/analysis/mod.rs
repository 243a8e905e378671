//! Analysis modules.
//!
//! Rollup of yearly records into per-region series, and the scales and
//! axis domains computed from them.

pub mod aggregator;
pub mod domain;
pub mod scale;

pub use aggregator::*;
pub use domain::{compute_domains, Domains};
