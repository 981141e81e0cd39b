//! Dataset retrieval from HTTP(S) endpoints or local files.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::data::parse::{parse_case_table, parse_countries};
use crate::domain::{AnalysisConfig, CaseTable, CountryInfo};
use crate::error::AppError;

/// Where a dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Http(String),
    File(PathBuf),
}

impl DataSource {
    /// `http://` and `https://` are remote; `file://<path>` and bare paths are local.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            DataSource::Http(raw.to_string())
        } else if let Some(path) = raw.strip_prefix("file://") {
            DataSource::File(PathBuf::from(path))
        } else {
            DataSource::File(PathBuf::from(raw))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DataSource::Http(url) => url.clone(),
            DataSource::File(path) => path.display().to_string(),
        }
    }
}

/// Both datasets as loaded, before cleaning.
#[derive(Debug, Clone)]
pub struct RawTables {
    pub cases: CaseTable,
    pub countries: Vec<CountryInfo>,
}

pub struct DatasetClient {
    client: Client,
}

impl DatasetClient {
    pub fn new(timeout_secs: u64) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .map_err(|e| AppError::fetch(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Fetch and parse the case and country datasets named in `config`.
    pub fn fetch_tables(&self, config: &AnalysisConfig) -> Result<RawTables, AppError> {
        let cases_source = DataSource::parse(&config.cases_source);
        let countries_source = DataSource::parse(&config.countries_source);

        log::info!("Loading cases from {}", cases_source.describe());
        let body = self.fetch_text(&cases_source)?;
        let cases = parse_case_table(&body, &cases_source.describe())?;
        log::info!("Loaded {} case rows ({} columns)", cases.n_rows(), cases.n_columns());

        log::info!("Loading countries from {}", countries_source.describe());
        let body = self.fetch_text(&countries_source)?;
        let countries = parse_countries(&body, &countries_source.describe())?;
        log::info!("Loaded {} countries", countries.len());

        Ok(RawTables { cases, countries })
    }

    pub fn fetch_text(&self, source: &DataSource) -> Result<String, AppError> {
        match source {
            DataSource::Http(url) => {
                let resp = self
                    .client
                    .get(url)
                    .send()
                    .map_err(|e| AppError::fetch(format!("Request to {url} failed: {e}")))?;

                if !resp.status().is_success() {
                    return Err(AppError::fetch(format!(
                        "Request to {url} failed with status {}.",
                        resp.status()
                    )));
                }

                resp.text()
                    .map_err(|e| AppError::fetch(format!("Failed to read response body from {url}: {e}")))
            }
            DataSource::File(path) => std::fs::read_to_string(path)
                .map_err(|e| AppError::fetch(format!("Failed to read '{}': {e}", path.display()))),
        }
    }
}
