//! Axis domains and ticks derived once from the full dataset.

use super::scale::{range, LinearScale};
use crate::models::Store;
use tracing::debug;

/// Lowest income tick and left edge of the x axis.
pub const MIN_INCOME_TICK: f64 = 10_000.0;
/// Spacing of income ticks.
pub const INCOME_STEP: f64 = 10_000.0;
/// Smallest upper bound of the income axis.
pub const INCOME_FLOOR: f64 = 110_000.0;
/// Rounding step of the poverty axis.
pub const POVERTY_STEP: f64 = 5.0;
/// Smallest upper bound of the poverty axis.
pub const POVERTY_FLOOR: f64 = 30.0;
/// Upper limit on poverty ticks.
pub const MAX_POVERTY_TICKS: f64 = 10.0;

/// Scales and ticks for both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Domains {
    pub x: LinearScale,
    pub y: LinearScale,
    pub income_ticks: Vec<f64>,
    pub poverty_ticks: Vec<f64>,
}

/// `max(floor, ceil(max / step) * step)`
pub fn upper_bound(max: f64, step: f64, floor: f64) -> f64 {
    floor.max((max / step).ceil() * step)
}

/// Compute axis domains over every year and region.
///
/// Returns `None` when there is no finite income or poverty value.
pub fn compute_domains(store: &Store, inner_width: f64, inner_height: f64) -> Option<Domains> {
    let points = || store.values().flat_map(|r| r.series.iter());

    let max_income = points()
        .map(|p| p.income)
        .filter(|v| v.is_finite())
        .reduce(f64::max)?;
    let max_poverty = points()
        .map(|p| p.poverty_rate)
        .filter(|v| v.is_finite())
        .reduce(f64::max)?;

    let income_top = upper_bound(max_income, INCOME_STEP, INCOME_FLOOR);
    let income_ticks = range(MIN_INCOME_TICK, income_top + 1.0, INCOME_STEP);
    let x = LinearScale::new([MIN_INCOME_TICK, income_top], [0.0, inner_width]);

    let poverty_top = upper_bound(max_poverty, POVERTY_STEP, POVERTY_FLOOR);
    let y = LinearScale::new([0.0, poverty_top], [inner_height, 0.0]).nice(10.0);
    let tick_count = MAX_POVERTY_TICKS.min(poverty_top / POVERTY_STEP);
    let poverty_ticks = y.ticks(tick_count);

    debug!(
        "Domains: income [{}, {}], poverty {:?}",
        MIN_INCOME_TICK,
        income_top,
        y.domain()
    );

    Some(Domains {
        x,
        y,
        income_ticks,
        poverty_ticks,
    })
}
