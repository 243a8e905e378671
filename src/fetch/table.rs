//! Raw tabular responses and the base/education join.
//!
//! The Census API answers with a JSON array of arrays: the first row is
//! the header, every following row holds string cells in header order.

use super::FetchError;
use crate::models::YearRecord;
use std::collections::HashMap;

/// Base variable holding the region display name.
pub const NAME: &str = "NAME";
/// Median household income.
pub const MEDIAN_INCOME: &str = "B19013_001E";
/// Population below the poverty level.
pub const POVERTY_NUM: &str = "B17001_002E";
/// Population for whom poverty status is determined.
pub const POVERTY_DEN: &str = "B17001_001E";

/// Population 25 years and over.
pub const EDU_TOTAL: &str = "B15003_001E";
pub const EDU_BACHELORS: &str = "B15003_022E";
pub const EDU_MASTERS: &str = "B15003_023E";
pub const EDU_PROFESSIONAL: &str = "B15003_024E";
pub const EDU_DOCTORATE: &str = "B15003_025E";

/// Variables requested for the base table.
pub const BASE_VARS: [&str; 4] = [NAME, MEDIAN_INCOME, POVERTY_NUM, POVERTY_DEN];

/// Variables requested for the education table.
pub const EDU_VARS: [&str; 5] = [
    EDU_TOTAL,
    EDU_BACHELORS,
    EDU_MASTERS,
    EDU_PROFESSIONAL,
    EDU_DOCTORATE,
];

/// A header row followed by data rows.
#[derive(Debug, Clone)]
pub struct RawTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    columns: HashMap<String, usize>,
}

impl RawTable {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let columns = header
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();

        Self {
            header,
            rows,
            columns,
        }
    }

    /// Parse an API response body.
    pub fn from_json(body: &str) -> Result<Self, FetchError> {
        let raw: Vec<Vec<Option<String>>> = serde_json::from_str(body)?;
        let mut iter = raw.into_iter();

        let header = iter
            .next()
            .ok_or(FetchError::EmptyTable)?
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();

        let rows = iter
            .map(|row| row.into_iter().map(Option::unwrap_or_default).collect())
            .collect();

        Ok(Self::new(header, rows))
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Index of a named column.
    pub fn column(&self, name: &str) -> Result<usize, FetchError> {
        self.columns
            .get(name)
            .copied()
            .ok_or_else(|| FetchError::MissingColumn(name.to_string()))
    }
}

/// Reads a cell, yielding an empty string past the end of a short row.
fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Reads a numeric cell. Unparsable or empty cells become NaN.
///
/// JSON `null` arrives here as an empty string, so a null income drops
/// the record instead of plotting it at zero.
fn number(row: &[String], idx: usize) -> f64 {
    cell(row, idx).trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// `part / whole * 100`, NaN unless `whole > 0`.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        f64::NAN
    }
}

/// One year's records keyed by region code, in first-seen order.
#[derive(Debug, Default)]
pub struct YearIndex {
    records: Vec<YearRecord>,
    by_region: HashMap<String, usize>,
}

impl YearIndex {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn get(&self, fips: &str) -> Option<&YearRecord> {
        self.by_region.get(fips).map(|&i| &self.records[i])
    }

    fn insert(&mut self, record: YearRecord) {
        match self.by_region.get(&record.fips) {
            Some(&i) => self.records[i] = record,
            None => {
                self.by_region.insert(record.fips.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    /// Drops records whose income or poverty rate is not finite.
    pub fn into_plottable(self) -> Vec<YearRecord> {
        self.records
            .into_iter()
            .filter(YearRecord::is_plottable)
            .collect()
    }
}

/// Build one year's records from the base table.
pub fn index_base(
    table: &RawTable,
    year: i32,
    region_column: &str,
) -> Result<YearIndex, FetchError> {
    let region = table.column(region_column)?;
    let name = table.column(NAME)?;
    let income = table.column(MEDIAN_INCOME)?;
    let pov_num = table.column(POVERTY_NUM)?;
    let pov_den = table.column(POVERTY_DEN)?;

    let mut index = YearIndex::default();
    for row in table.rows() {
        let poverty_rate = percentage(number(row, pov_num), number(row, pov_den));
        index.insert(YearRecord::new(
            year,
            cell(row, region).to_string(),
            cell(row, name).to_string(),
            number(row, income),
            poverty_rate,
        ));
    }

    Ok(index)
}

/// Merge the education share into matching base records.
///
/// Rows for regions missing from the base table are ignored.
/// Returns the number of records updated.
pub fn join_education(
    index: &mut YearIndex,
    table: &RawTable,
    region_column: &str,
) -> Result<usize, FetchError> {
    let region = table.column(region_column)?;
    let total = table.column(EDU_TOTAL)?;
    let degrees = [
        table.column(EDU_BACHELORS)?,
        table.column(EDU_MASTERS)?,
        table.column(EDU_PROFESSIONAL)?,
        table.column(EDU_DOCTORATE)?,
    ];

    let mut matched = 0;
    for row in table.rows() {
        let Some(&i) = index.by_region.get(cell(row, region)) else {
            continue;
        };

        let holders: f64 = degrees.iter().map(|&idx| number(row, idx)).sum();
        index.records[i].edu_pct = percentage(holders, number(row, total));
        matched += 1;
    }

    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_2015: &str = include_str!("../../fixtures/base_2015.json");
    const EDU_2015: &str = include_str!("../../fixtures/education_2015.json");

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_from_json_builds_column_map() {
        let table = RawTable::from_json(BASE_2015).unwrap();
        assert_eq!(table.header()[0], "NAME");
        assert_eq!(table.column("state").unwrap(), 4);
        assert_eq!(table.rows().len(), 5);
        assert!(matches!(
            table.column("B99999_001E"),
            Err(FetchError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_empty_and_malformed() {
        assert!(matches!(
            RawTable::from_json("[]"),
            Err(FetchError::EmptyTable)
        ));
        assert!(matches!(
            RawTable::from_json("{\"error\": \"unknown variable\"}"),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn test_null_cells_become_nan() {
        let table = RawTable::from_json(
            r#"[["NAME","B19013_001E","B17001_002E","B17001_001E","state"],
                ["Alabama",null,"10","100","01"]]"#,
        )
        .unwrap();
        let index = index_base(&table, 2012, "state").unwrap();
        assert!(index.get("01").unwrap().income.is_nan());
        assert!(index.into_plottable().is_empty());
    }

    #[test]
    fn test_index_base_computes_poverty_rate() {
        let table = RawTable::from_json(BASE_2015).unwrap();
        let index = index_base(&table, 2015, "state").unwrap();

        assert_eq!(index.len(), 5);
        let alabama = index.get("01").unwrap();
        assert_eq!(alabama.name, "Alabama");
        assert_eq!(alabama.year, 2015);
        assert!(approx(alabama.income, 43623.0));
        assert!(approx(alabama.poverty_rate, 18.0));
        assert!(alabama.edu_pct.is_nan());

        // Zero denominator is NaN, not an error
        assert!(index.get("72").unwrap().poverty_rate.is_nan());
    }

    #[test]
    fn test_into_plottable_drops_non_finite() {
        let table = RawTable::from_json(BASE_2015).unwrap();
        let records = index_base(&table, 2015, "state").unwrap().into_plottable();

        let codes: Vec<_> = records.iter().map(|r| r.fips.as_str()).collect();
        assert_eq!(codes, vec!["01", "06", "36", "56"]);
        for record in &records {
            assert!((0.0..=100.0).contains(&record.poverty_rate));
        }
    }

    #[test]
    fn test_join_education() {
        let base = RawTable::from_json(BASE_2015).unwrap();
        let edu = RawTable::from_json(EDU_2015).unwrap();
        let mut index = index_base(&base, 2015, "state").unwrap();

        let matched = join_education(&mut index, &edu, "state").unwrap();
        assert_eq!(matched, 3);

        assert!(approx(index.get("01").unwrap().edu_pct, 23.4375));
        assert!(approx(index.get("06").unwrap().edu_pct, 32.0));
        assert!(approx(index.get("36").unwrap().edu_pct, 35.0));

        // Present in base, absent from education
        assert!(index.get("56").unwrap().edu_pct.is_nan());
        // Present in education only: no orphan record
        assert!(index.get("99").is_none());
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn test_join_education_missing_column() {
        let base = RawTable::from_json(BASE_2015).unwrap();
        let edu = RawTable::from_json(r#"[["B15003_001E","state"],["10","01"]]"#).unwrap();
        let mut index = index_base(&base, 2015, "state").unwrap();

        assert!(join_education(&mut index, &edu, "state").is_err());
        assert!(index.get("01").unwrap().edu_pct.is_nan());
    }

    #[test]
    fn test_duplicate_region_overwrites_in_place() {
        let table = RawTable::new(
            BASE_VARS
                .iter()
                .map(|s| s.to_string())
                .chain(["state".to_string()])
                .collect(),
            vec![
                vec!["A".into(), "1".into(), "1".into(), "10".into(), "01".into()],
                vec!["B".into(), "2".into(), "1".into(), "10".into(), "02".into()],
                vec!["A2".into(), "3".into(), "1".into(), "10".into(), "01".into()],
            ],
        );
        let records = index_base(&table, 2020, "state").unwrap().into_plottable();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "A2");
        assert_eq!(records[1].fips, "02");
    }

    #[test]
    fn test_percentage() {
        assert!(approx(percentage(1.0, 4.0), 25.0));
        assert!(percentage(1.0, 0.0).is_nan());
        assert!(percentage(1.0, -5.0).is_nan());
        assert!(percentage(1.0, f64::NAN).is_nan());
    }
}
