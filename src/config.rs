//! Run configuration for the collectors and plotters

use crate::export::Delimiter;
use crate::paginator::PAGE_SIZE;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default GraphQL endpoint of the DAOstack subgraph.
pub const DAOSTACK_URL: &str = "https://api.thegraph.com/subgraphs/name/daostack/master";

pub const CENSUS_FILE: &str = "census.csv";
pub const PROPOSALS_FILE: &str = "proposals.csv";
pub const ACTIVITY_FILE: &str = "activity_serie.csv";

/// Proposals created after this unix timestamp are dropped from `proposals.csv`.
pub const PROPOSALS_CREATED_BEFORE: i64 = 1587596397;

/// Configuration shared by every collector run.
#[derive(Debug, Clone)]
pub struct CensusConfig {
    /// GraphQL endpoint (default: DAOstack subgraph)
    pub endpoint: String,
    /// Elements requested per page (default: 1000)
    pub page_size: usize,
    /// Directory holding inputs and exported tables (default: "datawarehouse")
    pub datawarehouse: PathBuf,
    /// Substring identifying the holdings file (default: "dao_holdings")
    pub holdings_marker: String,
    /// HTTP request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
    /// Wait before the single retry of a failed request (default: 45s)
    pub retry_cooldown: Duration,
    /// Pause between request batches of the activity collector (default: 30s)
    pub batch_pause: Duration,
    /// Cutoff applied to proposal creation time, `None` keeps everything
    pub proposals_created_before: Option<i64>,
    /// Delimiter of exported files (default: comma)
    pub delimiter: Delimiter,
}

impl Default for CensusConfig {
    fn default() -> Self {
        CensusConfig {
            endpoint: DAOSTACK_URL.to_string(),
            page_size: PAGE_SIZE,
            datawarehouse: PathBuf::from("datawarehouse"),
            holdings_marker: "dao_holdings".to_string(),
            timeout_seconds: 30,
            retry_cooldown: Duration::from_secs(45),
            batch_pause: Duration::from_secs(30),
            proposals_created_before: Some(PROPOSALS_CREATED_BEFORE),
            delimiter: Delimiter::Comma,
        }
    }
}

impl CensusConfig {
    /// Creates a configuration for the given endpoint and data-warehouse directory.
    pub fn new(endpoint: impl Into<String>, datawarehouse: impl Into<PathBuf>) -> Self {
        CensusConfig {
            endpoint: endpoint.into(),
            datawarehouse: datawarehouse.into(),
            ..CensusConfig::default()
        }
    }

    /// Removes every sleep from the run. Used by tests and dry runs.
    pub fn without_pauses(mut self) -> Self {
        self.retry_cooldown = Duration::ZERO;
        self.batch_pause = Duration::ZERO;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Path of a file inside the data-warehouse directory.
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.datawarehouse.join(file_name)
    }

    pub fn datawarehouse(&self) -> &Path {
        &self.datawarehouse
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CensusConfig::default();
        assert_eq!(config.page_size, 1000);
        assert_eq!(config.endpoint, DAOSTACK_URL);
        assert_eq!(config.retry_cooldown, Duration::from_secs(45));
        assert_eq!(config.batch_pause, Duration::from_secs(30));
        assert_eq!(config.output_path(CENSUS_FILE), PathBuf::from("datawarehouse/census.csv"));
    }

    #[test]
    fn test_without_pauses() {
        let config = CensusConfig::new("http://localhost:8000", "/tmp/dw").without_pauses();
        assert_eq!(config.retry_cooldown, Duration::ZERO);
        assert_eq!(config.batch_pause, Duration::ZERO);
        assert_eq!(config.endpoint, "http://localhost:8000");
        assert_eq!(config.datawarehouse(), Path::new("/tmp/dw"));
    }
}
