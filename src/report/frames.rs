//! Per-year SVG frame export.

use crate::models::{SizeField, Store};
use crate::render::{render_svg, Renderer};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

/// File name of one year's frame.
pub fn frame_name(year: i32) -> String {
    format!("frame-{}.svg", year)
}

/// Render every year in order and write one SVG per year into `dir`.
///
/// Each frame animates from the previous year's positions, the same
/// way scrubbing forward does.
pub fn write_frames(
    renderer: &mut Renderer,
    store: &Store,
    years: &[i32],
    size: SizeField,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut written = Vec::with_capacity(years.len());
    for &year in years {
        let now = Instant::now();
        let patch = renderer.render(store, year, size, now);
        debug!(
            "Frame {}: +{} ~{} -{} (animated: {})",
            year,
            patch.entered.len(),
            patch.updated.len(),
            patch.exited.len(),
            renderer.scene().is_animating(now)
        );

        let path = dir.join(frame_name(year));
        std::fs::write(&path, render_svg(renderer, now))
            .with_context(|| format!("Failed to write frame {}", path.display()))?;
        written.push(path);
    }

    Ok(written)
}
