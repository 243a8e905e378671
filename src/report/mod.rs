//! Output generation.
//!
//! SVG frames per year, the JSON store dump and the Markdown load summary.

pub mod frames;
pub mod generator;

pub use frames::write_frames;
pub use generator::{generate_json_store, generate_markdown_summary, LoadReport};
