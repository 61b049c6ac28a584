//! Resources exposed by a spreadsheet feed.

use serde::{Deserialize, Serialize};

/// A worksheet's contents: rows of text values in feed order.
///
/// Rows are not padded, so a sheet with gaps yields rows of differing length.
pub type Grid = Vec<Vec<String>>;

/// A spreadsheet visible to the authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadsheetRef {
    /// Display title.
    pub title: String,
    /// URL of the feed listing this spreadsheet's worksheets.
    pub worksheets_url: String,
    /// Feed entry id, when the service provides one.
    pub id: Option<String>,
}

impl SpreadsheetRef {
    /// Create a reference with no entry id.
    pub fn new(title: impl Into<String>, worksheets_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            worksheets_url: worksheets_url.into(),
            id: None,
        }
    }
}

/// A worksheet within a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorksheetRef {
    /// Display title.
    pub title: String,
    /// URL of the feed listing this worksheet's cells.
    pub cells_url: String,
    /// Feed entry id, when the service provides one.
    pub id: Option<String>,
}

impl WorksheetRef {
    /// Create a reference with no entry id.
    pub fn new(title: impl Into<String>, cells_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            cells_url: cells_url.into(),
            id: None,
        }
    }
}

/// A single non-empty cell. Indices are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
    pub value: String,
}

impl Cell {
    /// Create a cell at 1-based `row` and `col`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cellfeed_core::Cell;
    ///
    /// let cell = Cell::new(2, 1, "red");
    /// assert_eq!((cell.row, cell.col, cell.value.as_str()), (2, 1, "red"));
    /// ```
    pub fn new(row: u32, col: u32, value: impl Into<String>) -> Self {
        Self {
            row,
            col,
            value: value.into(),
        }
    }
}

/// The kind of feed being requested, which determines how its entries are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    Spreadsheet,
    Worksheet,
    Cell,
}

impl FeedKind {
    /// Lowercase name used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spreadsheet => "spreadsheet",
            Self::Worksheet => "worksheet",
            Self::Cell => "cell",
        }
    }
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Spreadsheet(SpreadsheetRef),
    Worksheet(WorksheetRef),
    Cell {
        /// Cell label as reported by the feed (for example `A1`).
        title: String,
        cell: Cell,
    },
}

impl Entry {
    /// The entry's display title.
    pub fn title(&self) -> &str {
        match self {
            Self::Spreadsheet(s) => &s.title,
            Self::Worksheet(w) => &w.title,
            Self::Cell { title, .. } => title,
        }
    }

    pub fn kind(&self) -> FeedKind {
        match self {
            Self::Spreadsheet(_) => FeedKind::Spreadsheet,
            Self::Worksheet(_) => FeedKind::Worksheet,
            Self::Cell { .. } => FeedKind::Cell,
        }
    }

    /// URL of the next-level feed. `None` for cell entries.
    pub fn child_feed_url(&self) -> Option<&str> {
        match self {
            Self::Spreadsheet(s) => Some(&s.worksheets_url),
            Self::Worksheet(w) => Some(&w.cells_url),
            Self::Cell { .. } => None,
        }
    }

    pub fn row(&self) -> Option<u32> {
        self.as_cell().map(|c| c.row)
    }

    pub fn col(&self) -> Option<u32> {
        self.as_cell().map(|c| c.col)
    }

    pub fn value(&self) -> Option<&str> {
        self.as_cell().map(|c| c.value.as_str())
    }

    pub fn as_cell(&self) -> Option<&Cell> {
        match self {
            Self::Cell { cell, .. } => Some(cell),
            _ => None,
        }
    }
}
