//! Error types for cellfeed.

use thiserror::Error;

/// Result type for cellfeed operations.
pub type FeedResult<T> = Result<T, FeedError>;

/// Errors that can occur while authenticating or fetching a worksheet.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Credential could not be parsed, scoped or exchanged for a token.
    #[error("Credential error: {0}")]
    Credential(String),

    /// No spreadsheet carries the requested title.
    #[error("Found 0 spreadsheets with name {title}")]
    SpreadsheetNotFound { title: String },

    /// More than one spreadsheet carries the requested title.
    #[error("Found {count} spreadsheets with name {title}")]
    AmbiguousSpreadsheet { title: String, count: usize },

    /// No worksheet in the spreadsheet carries the requested title.
    #[error("Found 0 worksheets with name {title} in spreadsheet {spreadsheet}")]
    WorksheetNotFound { spreadsheet: String, title: String },

    /// More than one worksheet in the spreadsheet carries the requested title.
    #[error("Found {count} worksheets with name {title} in spreadsheet {spreadsheet}")]
    AmbiguousWorksheet {
        spreadsheet: String,
        title: String,
        count: usize,
    },

    /// The feed endpoint could not be reached or answered with a non-success status.
    #[error("HTTP error for {url}: {message}")]
    Http {
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// The feed body could not be interpreted.
    #[error("Malformed feed at {url}: {message}")]
    MalformedFeed { url: String, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FeedError {
    /// Create a credential error.
    pub fn credential(message: impl Into<String>) -> Self {
        Self::Credential(message.into())
    }

    /// Create an HTTP error.
    pub fn http(url: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Http {
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a malformed feed error.
    pub fn malformed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedFeed {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Whether a title lookup found nothing.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SpreadsheetNotFound { .. } | Self::WorksheetNotFound { .. }
        )
    }

    /// Whether a title lookup found more than one candidate.
    pub fn is_ambiguous(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousSpreadsheet { .. } | Self::AmbiguousWorksheet { .. }
        )
    }

    /// Whether the failure came from the feed service rather than from this crate.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::MalformedFeed { .. })
    }

    /// Number of candidates a failed title lookup found.
    ///
    /// Returns `None` for errors that are not lookup failures.
    pub fn match_count(&self) -> Option<usize> {
        match self {
            Self::SpreadsheetNotFound { .. } | Self::WorksheetNotFound { .. } => Some(0),
            Self::AmbiguousSpreadsheet { count, .. } | Self::AmbiguousWorksheet { count, .. } => {
                Some(*count)
            }
            _ => None,
        }
    }
}
