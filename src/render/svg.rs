//! SVG serialization of the chart.
//!
//! A frame holds both axes, the grid, axis titles, the year label and
//! the mark layer. Marks that are mid-transition carry `<animate>`
//! elements so the file replays the movement from their prior position.

use super::renderer::Renderer;
use super::scene::{Mark, MarkAttrs};
use super::tooltip::{format_number, format_thousands, tooltip_lines};
use std::fmt::Write;
use std::time::Instant;

const TICK_SIZE: f64 = 6.0;
const TICK_PADDING: f64 = 3.0;
const GRID_STROKE: &str = "#e5e5e5";
const AXIS_STROKE: &str = "#000";

/// Cubic in-out as an SVG key spline.
const EASE_SPLINE: &str = "0.645 0.045 0.355 1";

/// Escape text for use in element content and attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Coordinates with at most two decimals.
fn num(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    format_number(rounded)
}

/// Serialize the renderer's current state as a standalone SVG document.
pub fn render_svg(renderer: &Renderer, now: Instant) -> String {
    let chart = renderer.chart();
    let iw = chart.inner_width();
    let ih = chart.inner_height();
    let m = chart.margin;

    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" font-family="sans-serif">"#,
        num(chart.width),
        num(chart.height)
    );
    let _ = writeln!(
        out,
        r#"<g transform="translate({},{})">"#,
        num(m.left),
        num(m.top)
    );

    if let Some(domains) = renderer.domains() {
        // Grid
        out.push_str("<g class=\"grid\">\n");
        for &t in &domains.income_ticks {
            let x = num(domains.x.apply(t));
            let _ = writeln!(
                out,
                r#"<line x1="{x}" x2="{x}" y1="0" y2="{}" stroke="{GRID_STROKE}"/>"#,
                num(ih)
            );
        }
        for &t in &domains.poverty_ticks {
            let y = num(domains.y.apply(t));
            let _ = writeln!(
                out,
                r#"<line x1="0" x2="{}" y1="{y}" y2="{y}" stroke="{GRID_STROKE}"/>"#,
                num(iw)
            );
        }
        out.push_str("</g>\n");

        // Bottom axis
        let _ = writeln!(
            out,
            r#"<g class="axis x" transform="translate(0,{})" font-size="10" text-anchor="middle">"#,
            num(ih)
        );
        let _ = writeln!(
            out,
            r#"<line x1="0" x2="{}" y1="0" y2="0" stroke="{AXIS_STROKE}"/>"#,
            num(iw)
        );
        for &t in &domains.income_ticks {
            let x = num(domains.x.apply(t));
            let _ = writeln!(
                out,
                r#"<g transform="translate({x},0)"><line y2="{TICK_SIZE}" stroke="{AXIS_STROKE}"/><text y="{}" dy="0.71em">${}</text></g>"#,
                TICK_SIZE + TICK_PADDING,
                format_thousands(t)
            );
        }
        out.push_str("</g>\n");

        // Left axis
        out.push_str(
            "<g class=\"axis y\" font-size=\"10\" text-anchor=\"end\">\n",
        );
        let _ = writeln!(
            out,
            r#"<line x1="0" x2="0" y1="0" y2="{}" stroke="{AXIS_STROKE}"/>"#,
            num(ih)
        );
        for &t in &domains.poverty_ticks {
            let y = num(domains.y.apply(t));
            let _ = writeln!(
                out,
                r#"<g transform="translate(0,{y})"><line x2="-{TICK_SIZE}" stroke="{AXIS_STROKE}"/><text x="-{}" dy="0.32em">{}%</text></g>"#,
                TICK_SIZE + TICK_PADDING,
                format_number(t)
            );
        }
        out.push_str("</g>\n");
    }

    if let Some(year) = renderer.year() {
        let _ = writeln!(
            out,
            r##"<text class="year" x="{}" y="48" font-size="48" fill="#bbb" text-anchor="end">{}</text>"##,
            num(iw - 8.0),
            year
        );
    }

    out.push_str("<g class=\"dots\">\n");
    for mark in renderer.scene().marks() {
        write_mark(&mut out, mark, now);
    }
    out.push_str("</g>\n");
    out.push_str("</g>\n");

    // Axis titles
    let _ = writeln!(
        out,
        r##"<text x="{}" y="{}" text-anchor="middle" fill="#000" font-size="24">Median household income (USD)</text>"##,
        num(m.left + iw / 2.0),
        num(chart.height - 10.0)
    );
    let _ = writeln!(
        out,
        r##"<text transform="translate(18,{}) rotate(-90)" text-anchor="middle" fill="#000" font-size="24">Poverty rate (%)</text>"##,
        num(m.top + ih / 2.0)
    );

    out.push_str("</svg>\n");
    out
}

fn write_mark(out: &mut String, mark: &Mark, now: Instant) {
    let target = mark.target;
    let _ = write!(
        out,
        r#"<circle class="dot" data-key="{}" cx="{}" cy="{}" r="{}" fill="{}">"#,
        escape(&mark.key),
        num(target.cx),
        num(target.cy),
        num(target.r),
        escape(&mark.fill)
    );
    let _ = write!(
        out,
        "<title>{}</title>",
        escape(&tooltip_lines(&mark.datum).join("\n"))
    );

    if let Some(tr) = &mark.transition {
        let elapsed = now.saturating_duration_since(tr.started);
        if elapsed < tr.duration {
            let from = mark.attrs_at(now);
            let remaining = (tr.duration - elapsed).as_millis();
            write_animation(out, &from, &target, remaining);
        }
    }

    out.push_str("</circle>\n");
}

fn write_animation(out: &mut String, from: &MarkAttrs, to: &MarkAttrs, millis: u128) {
    for (attr, a, b) in [
        ("cx", from.cx, to.cx),
        ("cy", from.cy, to.cy),
        ("r", from.r, to.r),
    ] {
        if num(a) == num(b) {
            continue;
        }
        let _ = write!(
            out,
            r#"<animate attributeName="{attr}" from="{}" to="{}" dur="{millis}ms" fill="freeze" calcMode="spline" keyTimes="0;1" keySplines="{EASE_SPLINE}"/>"#,
            num(a),
            num(b)
        );
    }
}
