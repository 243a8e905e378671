//! Rollup of flat yearly records into per-region series.

use crate::models::{RegionSeries, SeriesPoint, Store, YearRecord};

/// Group records by region code and order each series by year.
///
/// The first-seen display name wins. Duplicate years are kept.
pub fn rollup_by_region(records: &[YearRecord]) -> Store {
    let mut store = Store::new();

    for record in records {
        store
            .entry(record.fips.clone())
            .or_insert_with(|| RegionSeries {
                fips: record.fips.clone(),
                name: record.name.clone(),
                series: Vec::new(),
            })
            .series
            .push(SeriesPoint::from(record));
    }

    // Stable, so duplicate years keep input order
    for region in store.values_mut() {
        region.series.sort_by_key(|p| p.year);
    }

    store
}

/// Smallest and largest year present in the store.
pub fn year_bounds(store: &Store) -> Option<(i32, i32)> {
    let years = store.values().flat_map(|r| r.series.iter().map(|p| p.year));
    let (min, max) = years.fold((i32::MAX, i32::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));

    (min <= max).then_some((min, max))
}

/// Number of regions with data per year, ascending by year.
pub fn regions_per_year(store: &Store) -> Vec<(i32, usize)> {
    let mut counts = std::collections::BTreeMap::new();

    for region in store.values() {
        for point in &region.series {
            *counts.entry(point.year).or_insert(0usize) += 1;
        }
    }

    counts.into_iter().collect()
}
