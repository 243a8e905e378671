//! Per-year projection and mark layout.

use super::scene::{MarkAttrs, MarkSpec, Patch, Scene};
use crate::analysis::scale::SqrtScale;
use crate::analysis::Domains;
use crate::config::ChartConfig;
use crate::models::{SizeField, Store, VisibleRecord};
use std::time::{Duration, Instant};
use tracing::debug;

/// Records of every region that has a point for exactly `year`.
pub fn project_year(store: &Store, year: i32) -> Vec<VisibleRecord> {
    store
        .values()
        .filter_map(|region| {
            region
                .point_for(year)
                .map(|point| VisibleRecord::from_point(region, point))
        })
        .collect()
}

/// Radius mapping for one render.
#[derive(Debug, Clone, Copy)]
pub struct SizeEncoding {
    field: SizeField,
    scale: Option<SqrtScale>,
    default_radius: f64,
}

impl SizeEncoding {
    /// Build the encoding for the visible records.
    ///
    /// Falls back to a uniform radius unless the field has at least two
    /// finite values among `records`.
    pub fn for_records(
        records: &[VisibleRecord],
        field: SizeField,
        radius_range: [f64; 2],
        default_radius: f64,
    ) -> Self {
        let values: Vec<f64> = records
            .iter()
            .filter_map(|d| d.field(field))
            .filter(|v| v.is_finite())
            .collect();

        let scale = if values.len() >= 2 {
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            Some(SqrtScale::new([min, max], radius_range))
        } else {
            None
        };

        Self {
            field,
            scale,
            default_radius,
        }
    }

    /// Whether radius varies with the data.
    pub fn is_active(&self) -> bool {
        self.scale.is_some()
    }

    pub fn radius(&self, record: &VisibleRecord) -> f64 {
        match (self.scale, record.field(self.field)) {
            (Some(scale), Some(v)) if v.is_finite() => scale.apply(v),
            _ => self.default_radius,
        }
    }
}

/// Projects the store onto the chart and keeps the mark layer current.
pub struct Renderer {
    chart: ChartConfig,
    domains: Option<Domains>,
    scene: Scene,
    year: Option<i32>,
}

impl Renderer {
    pub fn new(chart: ChartConfig, domains: Option<Domains>) -> Self {
        let scene = Scene::new(Duration::from_millis(chart.transition_ms));
        Self {
            chart,
            domains,
            scene,
            year: None,
        }
    }

    pub fn chart(&self) -> &ChartConfig {
        &self.chart
    }

    pub fn domains(&self) -> Option<&Domains> {
        self.domains.as_ref()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Year of the last render.
    pub fn year(&self) -> Option<i32> {
        self.year
    }

    /// Render `year`, animating marks that were already on screen.
    ///
    /// Without domains there is nothing to plot and the patch is empty.
    pub fn render(&mut self, store: &Store, year: i32, size: SizeField, now: Instant) -> Patch {
        let Some(domains) = &self.domains else {
            debug!("No domains, skipping render of {}", year);
            return Patch::default();
        };

        let records = project_year(store, year);
        let encoding = SizeEncoding::for_records(
            &records,
            size,
            self.chart.radius_range,
            self.chart.default_radius,
        );
        if size != SizeField::None && !encoding.is_active() {
            debug!("Too few {} values in {}, using uniform radius", size, year);
        }

        let specs = records
            .into_iter()
            .map(|d| MarkSpec {
                key: d.fips.clone(),
                attrs: MarkAttrs {
                    cx: domains.x.apply(d.income),
                    cy: domains.y.apply(d.poverty_rate),
                    r: encoding.radius(&d),
                },
                fill: self.chart.fill.clone(),
                datum: d,
            })
            .collect();

        self.year = Some(year);
        let patch = self.scene.reconcile(specs, now);
        debug!(
            "Rendered {}: {} entered, {} updated, {} exited",
            year,
            patch.entered.len(),
            patch.updated.len(),
            patch.exited.len()
        );
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{compute_domains, rollup_by_region};
    use crate::models::YearRecord;

    fn record(year: i32, fips: &str, income: f64, poverty: f64, edu: f64) -> YearRecord {
        let mut r = YearRecord::new(year, fips.to_string(), format!("R{}", fips), income, poverty);
        r.edu_pct = edu;
        r
    }

    fn sample_store() -> Store {
        rollup_by_region(&[
            record(2010, "06", 60000.0, 15.0, f64::NAN),
            record(2012, "06", 62000.0, 16.0, 31.0),
            record(2010, "36", 55000.0, 14.0, f64::NAN),
            record(2011, "36", 56000.0, 14.5, f64::NAN),
            record(2012, "36", 57000.0, 15.0, 34.0),
        ])
    }

    fn renderer_for(store: &Store) -> Renderer {
        let chart = ChartConfig::default();
        let domains = compute_domains(store, chart.inner_width(), chart.inner_height());
        Renderer::new(chart, domains)
    }

    #[test]
    fn test_project_year_omits_regions_without_data() {
        let store = sample_store();

        let visible = project_year(&store, 2011);
        let keys: Vec<_> = visible.iter().map(|d| d.fips.as_str()).collect();
        assert_eq!(keys, vec!["36"]);

        assert_eq!(project_year(&store, 2012).len(), 2);
        assert!(project_year(&store, 2009).is_empty());
    }

    #[test]
    fn test_scrubbing_moves_marks() {
        let store = sample_store();
        let mut renderer = renderer_for(&store);
        let now = Instant::now();

        let patch = renderer.render(&store, 2010, SizeField::None, now);
        assert_eq!(patch.entered, vec!["06", "36"]);

        let patch = renderer.render(&store, 2011, SizeField::None, now);
        assert_eq!(patch.updated, vec!["36"]);
        assert_eq!(patch.exited, vec!["06"]);

        let patch = renderer.render(&store, 2012, SizeField::None, now);
        assert_eq!(patch.entered, vec!["06"]);
        assert_eq!(patch.updated, vec!["36"]);
        assert_eq!(renderer.year(), Some(2012));
    }

    #[test]
    fn test_positions_follow_scales() {
        let store = sample_store();
        let mut renderer = renderer_for(&store);
        renderer.render(&store, 2010, SizeField::None, Instant::now());

        let mark = renderer.scene().get("06").unwrap();
        // income 60000 on [10000, 110000] -> [0, 944]
        assert!((mark.target.cx - 472.0).abs() < 1e-9);
        // poverty 15 on [0, 30] -> [416, 0]
        assert!((mark.target.cy - 208.0).abs() < 1e-9);
        assert_eq!(mark.target.r, 5.0);
        assert_eq!(mark.fill, "#2b7cff");
    }

    #[test]
    fn test_size_encoding_uses_extent() {
        let store = sample_store();
        let mut renderer = renderer_for(&store);
        renderer.render(&store, 2012, SizeField::Education, Instant::now());

        assert_eq!(renderer.scene().get("06").unwrap().target.r, 3.0);
        assert_eq!(renderer.scene().get("36").unwrap().target.r, 10.0);
    }

    #[test]
    fn test_size_encoding_falls_back_with_too_few_values() {
        let store = sample_store();
        let mut renderer = renderer_for(&store);

        // 2010 has no finite education values
        renderer.render(&store, 2010, SizeField::Education, Instant::now());
        assert!(renderer.scene().marks().iter().all(|m| m.target.r == 5.0));

        // 2011 has a single region
        renderer.render(&store, 2011, SizeField::Income, Instant::now());
        assert!(renderer.scene().marks().iter().all(|m| m.target.r == 5.0));
    }

    #[test]
    fn test_non_finite_field_gets_default_radius() {
        let records = vec![
            VisibleRecord::from_point(
                &sample_store()["06"],
                &sample_store()["06"].series[1],
            ),
            VisibleRecord {
                fips: "01".into(),
                name: "R01".into(),
                year: 2012,
                income: 1.0,
                poverty_rate: 1.0,
                edu_pct: f64::NAN,
            },
            VisibleRecord {
                fips: "02".into(),
                name: "R02".into(),
                year: 2012,
                income: 1.0,
                poverty_rate: 1.0,
                edu_pct: 49.0,
            },
        ];
        let encoding = SizeEncoding::for_records(&records, SizeField::Education, [3.0, 10.0], 5.0);

        assert!(encoding.is_active());
        assert_eq!(encoding.radius(&records[1]), 5.0);
        assert_eq!(encoding.radius(&records[2]), 10.0);
    }

    #[test]
    fn test_render_without_domains_is_noop() {
        let store = Store::new();
        let mut renderer = Renderer::new(ChartConfig::default(), None);

        let patch = renderer.render(&store, 2010, SizeField::None, Instant::now());

        assert!(patch.is_empty());
        assert!(renderer.scene().marks().is_empty());
        assert_eq!(renderer.year(), None);
    }
}
