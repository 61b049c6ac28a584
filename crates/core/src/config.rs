//! Endpoint and client configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FeedError, FeedResult};

/// Permission scope for read access to spreadsheet feeds.
pub const DEFAULT_SCOPE: &str = "https://spreadsheets.google.com/feeds";

/// Feed listing every spreadsheet visible to the session.
pub const DEFAULT_SPREADSHEETS_URL: &str =
    "https://spreadsheets.google.com/feeds/spreadsheets/private/full";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings shared by the fetcher and the feed service.
///
/// Every field has a default, so a YAML file only needs the keys it overrides:
///
/// ```
/// use cellfeed_core::FeedConfig;
///
/// let config = FeedConfig::from_yaml_str("timeout_secs: 5\n").unwrap();
/// assert_eq!(config.timeout_secs, 5);
/// assert_eq!(config.scope, cellfeed_core::config::DEFAULT_SCOPE);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Sent as the `User-Agent` of every request.
    pub application_name: String,
    /// Scope requested for the service-account token.
    pub scope: String,
    /// URL of the spreadsheet-list feed.
    pub spreadsheets_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Sort cells by row and column before grouping them into rows.
    pub sort_cells: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            application_name: concat!("cellfeed/", env!("CARGO_PKG_VERSION")).to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            spreadsheets_url: DEFAULT_SPREADSHEETS_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            sort_cells: false,
        }
    }
}

impl FeedConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(input: &str) -> FeedResult<Self> {
        let config: Self = serde_yaml::from_str(input)
            .map_err(|e| FeedError::Config(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> FeedResult<Self> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|e| {
            FeedError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&input)
    }

    /// Point the spreadsheet-list feed at another URL.
    #[must_use]
    pub fn with_spreadsheets_url(mut self, url: impl Into<String>) -> Self {
        self.spreadsheets_url = url.into();
        self
    }

    /// Sort cells by `(row, col)` before they are grouped into rows.
    #[must_use]
    pub fn with_sort_cells(mut self, sort_cells: bool) -> Self {
        self.sort_cells = sort_cells;
        self
    }

    /// Check that the settings can be used to build a client.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Config`] if `scope` or `spreadsheets_url` is blank
    /// or `timeout_secs` is zero.
    pub fn validate(&self) -> FeedResult<()> {
        if self.scope.trim().is_empty() {
            return Err(FeedError::Config("scope must not be empty".to_string()));
        }
        if self.spreadsheets_url.trim().is_empty() {
            return Err(FeedError::Config(
                "spreadsheets_url must not be empty".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(FeedError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
