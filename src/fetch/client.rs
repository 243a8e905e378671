//! HTTP client for the Census data API.

use super::table::RawTable;
use super::FetchError;
use crate::config::ApiConfig;
use std::future::Future;
use tracing::debug;

/// Anything that can answer a table request for a year.
pub trait TableSource {
    /// Fetch the given variables for every region in `year`.
    fn fetch_table(
        &self,
        year: i32,
        vars: &[&str],
    ) -> impl Future<Output = Result<RawTable, FetchError>>;
}

/// Census API client.
pub struct CensusClient {
    http: reqwest::Client,
    api: ApiConfig,
}

impl CensusClient {
    pub fn new(api: ApiConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("acsplot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, api })
    }

    /// Request URL for a year and variable list.
    pub fn url_for(&self, year: i32, vars: &[&str]) -> String {
        url_for(&self.api, year, vars)
    }
}

/// `{base}/{year}/{dataset}?get={vars}&for={geography}`
pub fn url_for(api: &ApiConfig, year: i32, vars: &[&str]) -> String {
    format!(
        "{}/{}/{}?get={}&for={}",
        api.base_url.trim_end_matches('/'),
        year,
        api.dataset,
        vars.join(","),
        api.geography
    )
}

impl TableSource for CensusClient {
    async fn fetch_table(&self, year: i32, vars: &[&str]) -> Result<RawTable, FetchError> {
        let url = self.url_for(year, vars);
        debug!("GET {}", url);

        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        RawTable::from_json(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::table::{BASE_VARS, EDU_VARS};

    #[test]
    fn test_url_for_base() {
        let api = ApiConfig::default();
        assert_eq!(
            url_for(&api, 2015, &BASE_VARS),
            "https://api.census.gov/data/2015/acs/acs5?get=NAME,B19013_001E,B17001_002E,B17001_001E&for=state:*"
        );
    }

    #[test]
    fn test_url_for_trims_trailing_slash() {
        let api = ApiConfig {
            base_url: "http://localhost:8080/data/".to_string(),
            ..ApiConfig::default()
        };
        let url = url_for(&api, 2020, &EDU_VARS);
        assert!(url.starts_with("http://localhost:8080/data/2020/acs/acs5?get=B15003_001E,"));
        assert!(url.ends_with("B15003_025E&for=state:*"));
    }
}
