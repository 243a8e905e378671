//! Tooltip text and placement.

use crate::models::VisibleRecord;

/// Minimum distance between the tooltip anchor and the surface edge.
pub const EDGE_PADDING: f64 = 12.0;

/// `1234567.4` -> `1,234,567`
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return "NaN".to_string();
    }

    let digits = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if value < 0.0 && digits.chars().any(|c| c != '0') {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// One decimal place.
pub fn format_percent(value: f64) -> String {
    format!("{:.1}", value)
}

/// Tick and label values: integers without a fraction, others as-is.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

/// Visible tooltip.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub key: String,
    pub lines: Vec<String>,
    pub x: f64,
    pub y: f64,
}

impl Tooltip {
    /// Tooltip for `record` anchored near `pointer` within a `width`×`height` surface.
    pub fn show(record: &VisibleRecord, pointer: (f64, f64), width: f64, height: f64) -> Self {
        let (x, y) = clamp_position(pointer, width, height);
        Self {
            key: record.fips.clone(),
            lines: tooltip_lines(record),
            x,
            y,
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Name and year, income, poverty, and education when known.
pub fn tooltip_lines(record: &VisibleRecord) -> Vec<String> {
    let mut lines = vec![
        format!("{} · {}", record.name, record.year),
        format!("Median income: ${}", format_thousands(record.income)),
        format!("Poverty rate: {}%", format_percent(record.poverty_rate)),
    ];
    if record.edu_pct.is_finite() {
        lines.push(format!("Bachelor's+: {}%", format_percent(record.edu_pct)));
    }
    lines
}

/// Keep the anchor at least [`EDGE_PADDING`] inside the surface.
pub fn clamp_position(pointer: (f64, f64), width: f64, height: f64) -> (f64, f64) {
    let (mx, my) = pointer;
    (
        mx.max(EDGE_PADDING).min(width - EDGE_PADDING),
        my.max(EDGE_PADDING).min(height - EDGE_PADDING),
    )
}
