//! Concurrent per-year loading.
//!
//! Every year is fetched independently. A failed base request empties
//! that year only; a failed education request is ignored.

use super::client::TableSource;
use super::table::{index_base, join_education, BASE_VARS, EDU_VARS};
use super::FetchError;
use crate::config::ApiConfig;
use crate::models::{YearOutcome, YearRecord};
use futures::future::join_all;
use indicatif::ProgressBar;
use tracing::{debug, info, warn};

/// Settings that shape a single year's fetch.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// First year for which education is requested.
    pub education_start_year: i32,
    /// Header column holding the region code.
    pub region_column: String,
}

impl From<&ApiConfig> for LoadOptions {
    fn from(api: &ApiConfig) -> Self {
        Self {
            education_start_year: api.education_start_year,
            region_column: api.region_column().to_string(),
        }
    }
}

/// Fetch and join one year. Errors only on base table failure.
pub async fn fetch_year<S: TableSource>(
    source: &S,
    year: i32,
    options: &LoadOptions,
) -> Result<YearOutcome, FetchError> {
    let base = source.fetch_table(year, &BASE_VARS).await?;
    debug!(
        "{}: base table with {} columns, {} rows",
        year,
        base.header().len(),
        base.rows().len()
    );
    let mut index = index_base(&base, year, &options.region_column)?;

    let mut education_merged = false;
    if year >= options.education_start_year {
        let joined = match source.fetch_table(year, &EDU_VARS).await {
            Ok(table) => join_education(&mut index, &table, &options.region_column),
            Err(e) => Err(e),
        };

        match joined {
            Ok(matched) => {
                debug!("{}: education merged into {} regions", year, matched);
                education_merged = true;
            }
            Err(e) => debug!("{}: education unavailable: {}", year, e),
        }
    }

    let indexed = index.len();
    let records = index.into_plottable();
    if records.len() < indexed {
        debug!(
            "{}: dropped {} regions without finite income/poverty",
            year,
            indexed - records.len()
        );
    }

    Ok(YearOutcome {
        year,
        records,
        education_merged,
        error: None,
    })
}

/// Fetch all years concurrently and wait for every attempt.
///
/// Results come back in the order of `years`.
pub async fn load_years<S: TableSource>(
    source: &S,
    years: &[i32],
    options: &LoadOptions,
    progress: Option<&ProgressBar>,
) -> Vec<YearOutcome> {
    info!("Fetching {} years", years.len());

    let tasks = years.iter().map(|&year| async move {
        let outcome = match fetch_year(source, year, options).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("{}: skipped: {}", year, e);
                YearOutcome::failed(year, e.to_string())
            }
        };

        if let Some(pb) = progress {
            pb.inc(1);
        }

        outcome
    });

    join_all(tasks).await
}

/// Concatenate the records of all years.
pub fn flatten(outcomes: &[YearOutcome]) -> Vec<YearRecord> {
    outcomes
        .iter()
        .flat_map(|o| o.records.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::table::RawTable;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const BASE_2015: &str = include_str!("../../fixtures/base_2015.json");
    const EDU_2015: &str = include_str!("../../fixtures/education_2015.json");

    /// Serves canned bodies keyed by (year, first variable).
    #[derive(Default)]
    struct FakeSource {
        bodies: HashMap<(i32, &'static str), Result<&'static str, u16>>,
        requests: Mutex<Vec<(i32, String)>>,
    }

    impl FakeSource {
        fn with(mut self, year: i32, first_var: &'static str, body: Result<&'static str, u16>) -> Self {
            self.bodies.insert((year, first_var), body);
            self
        }

        fn requested(&self, year: i32, first_var: &str) -> bool {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .any(|(y, v)| *y == year && v == first_var)
        }
    }

    impl TableSource for FakeSource {
        async fn fetch_table(&self, year: i32, vars: &[&str]) -> Result<RawTable, FetchError> {
            self.requests
                .lock()
                .unwrap()
                .push((year, vars[0].to_string()));

            let key = self
                .bodies
                .keys()
                .find(|(y, v)| *y == year && *v == vars[0])
                .copied();

            match key.and_then(|k| self.bodies.get(&k)) {
                Some(Ok(body)) => RawTable::from_json(body),
                Some(Err(status)) => Err(FetchError::Status {
                    status: *status,
                    url: format!("fake://{}", year),
                }),
                None => Err(FetchError::Status {
                    status: 404,
                    url: format!("fake://{}", year),
                }),
            }
        }
    }

    fn options() -> LoadOptions {
        LoadOptions::from(&ApiConfig::default())
    }

    #[test]
    fn test_fetch_year_joins_education() {
        let source = FakeSource::default()
            .with(2015, "NAME", Ok(BASE_2015))
            .with(2015, "B15003_001E", Ok(EDU_2015));

        let outcome = tokio_test::block_on(fetch_year(&source, 2015, &options())).unwrap();

        assert!(outcome.education_merged);
        assert_eq!(outcome.records.len(), 4);
        let wyoming = outcome.records.iter().find(|r| r.fips == "56").unwrap();
        assert!(wyoming.edu_pct.is_nan());
        let alabama = outcome.records.iter().find(|r| r.fips == "01").unwrap();
        assert!(alabama.edu_pct.is_finite());
    }

    #[test]
    fn test_education_not_requested_before_cutoff() {
        let source = FakeSource::default()
            .with(2011, "NAME", Ok(BASE_2015))
            .with(2011, "B15003_001E", Ok(EDU_2015));

        let outcome = tokio_test::block_on(fetch_year(&source, 2011, &options())).unwrap();

        assert!(!outcome.education_merged);
        assert!(source.requested(2011, "NAME"));
        assert!(!source.requested(2011, "B15003_001E"));
        assert!(outcome.records.iter().all(|r| r.edu_pct.is_nan()));
    }

    #[test]
    fn test_education_failure_is_swallowed() {
        let source = FakeSource::default()
            .with(2016, "NAME", Ok(BASE_2015))
            .with(2016, "B15003_001E", Err(400));

        let outcome = tokio_test::block_on(fetch_year(&source, 2016, &options())).unwrap();

        assert!(!outcome.education_merged);
        assert!(outcome.is_success());
        assert_eq!(outcome.records.len(), 4);
    }

    #[test]
    fn test_education_parse_failure_is_swallowed() {
        let source = FakeSource::default()
            .with(2017, "NAME", Ok(BASE_2015))
            .with(2017, "B15003_001E", Ok("not json"));

        let outcome = tokio_test::block_on(fetch_year(&source, 2017, &options())).unwrap();
        assert!(!outcome.education_merged);
        assert_eq!(outcome.records.len(), 4);
    }

    #[test]
    fn test_base_failure_is_hard_for_that_year() {
        let source = FakeSource::default().with(2014, "NAME", Err(500));
        let result = tokio_test::block_on(fetch_year(&source, 2014, &options()));
        assert!(matches!(
            result,
            Err(FetchError::Status { status: 500, .. })
        ));
    }

    #[test]
    fn test_load_years_isolates_failures() {
        let source = FakeSource::default()
            .with(2012, "NAME", Ok(BASE_2015))
            .with(2013, "NAME", Err(503))
            .with(2014, "NAME", Ok(BASE_2015));

        let outcomes =
            tokio_test::block_on(load_years(&source, &[2012, 2013, 2014], &options(), None));

        let years: Vec<_> = outcomes.iter().map(|o| o.year).collect();
        assert_eq!(years, vec![2012, 2013, 2014]);
        assert!(outcomes[0].is_success());
        assert!(!outcomes[1].is_success());
        assert!(outcomes[1].records.is_empty());
        assert!(outcomes[2].is_success());

        let records = flatten(&outcomes);
        assert_eq!(records.len(), 8);
        assert!(records.iter().all(|r| r.year != 2013));
        assert!(records.iter().all(YearRecord::is_plottable));
    }

    #[test]
    fn test_load_years_with_progress() {
        let source = FakeSource::default().with(2019, "NAME", Ok(BASE_2015));
        let pb = ProgressBar::hidden();
        pb.set_length(2);

        tokio_test::block_on(load_years(&source, &[2019, 2020], &options(), Some(&pb)));

        assert_eq!(pb.position(), 2);
    }
}
