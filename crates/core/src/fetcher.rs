//! Title-based worksheet lookup.

use tracing::{debug, info};

use crate::config::FeedConfig;
use crate::error::{FeedError, FeedResult};
use crate::feed::FeedService;
use crate::grid::{reshape, reshape_sorted};
use crate::model::{Cell, Entry, FeedKind, Grid, SpreadsheetRef, WorksheetRef};

/// Resolves spreadsheets and worksheets by title and reads their cells.
///
/// The fetcher holds no state between calls; every lookup queries the feed
/// service again.
pub struct WorksheetFetcher<S> {
    service: S,
    config: FeedConfig,
}

impl<S: FeedService> WorksheetFetcher<S> {
    /// Create a fetcher that reads feeds through `service`.
    ///
    /// `config` supplies the spreadsheet-list URL and whether cells are sorted
    /// before reshaping. The HTTP crate's top-level docs show a full example.
    pub fn new(service: S, config: FeedConfig) -> Self {
        Self { service, config }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// List every spreadsheet visible to the session, in feed order.
    pub async fn list_spreadsheets(&self, session: &S::Session) -> FeedResult<Vec<SpreadsheetRef>> {
        let url = &self.config.spreadsheets_url;
        let entries = self
            .fetch_entries(session, url, FeedKind::Spreadsheet)
            .await?;

        entries
            .into_iter()
            .map(|entry| match entry {
                Entry::Spreadsheet(spreadsheet) => Ok(spreadsheet),
                other => Err(unexpected_entry(url, FeedKind::Spreadsheet, &other)),
            })
            .collect()
    }

    /// Find the one spreadsheet titled exactly `title`.
    pub async fn find_spreadsheet(
        &self,
        session: &S::Session,
        title: &str,
    ) -> FeedResult<SpreadsheetRef> {
        let spreadsheets = self.list_spreadsheets(session).await?;
        match single_match(spreadsheets, |s| s.title == title) {
            Ok(spreadsheet) => Ok(spreadsheet),
            Err(0) => Err(FeedError::SpreadsheetNotFound {
                title: title.to_string(),
            }),
            Err(count) => Err(FeedError::AmbiguousSpreadsheet {
                title: title.to_string(),
                count,
            }),
        }
    }

    /// List the worksheets of `spreadsheet`, in feed order.
    pub async fn list_worksheets(
        &self,
        session: &S::Session,
        spreadsheet: &SpreadsheetRef,
    ) -> FeedResult<Vec<WorksheetRef>> {
        let url = &spreadsheet.worksheets_url;
        let entries = self.fetch_entries(session, url, FeedKind::Worksheet).await?;

        entries
            .into_iter()
            .map(|entry| match entry {
                Entry::Worksheet(worksheet) => Ok(worksheet),
                other => Err(unexpected_entry(url, FeedKind::Worksheet, &other)),
            })
            .collect()
    }

    /// Find the one worksheet of `spreadsheet` titled exactly `title`.
    pub async fn find_worksheet(
        &self,
        session: &S::Session,
        spreadsheet: &SpreadsheetRef,
        title: &str,
    ) -> FeedResult<WorksheetRef> {
        let worksheets = self.list_worksheets(session, spreadsheet).await?;
        match single_match(worksheets, |w| w.title == title) {
            Ok(worksheet) => Ok(worksheet),
            Err(0) => Err(FeedError::WorksheetNotFound {
                spreadsheet: spreadsheet.title.clone(),
                title: title.to_string(),
            }),
            Err(count) => Err(FeedError::AmbiguousWorksheet {
                spreadsheet: spreadsheet.title.clone(),
                title: title.to_string(),
                count,
            }),
        }
    }

    /// Read the cells of `worksheet` in the order the feed delivers them.
    pub async fn fetch_cells(
        &self,
        session: &S::Session,
        worksheet: &WorksheetRef,
    ) -> FeedResult<Vec<Cell>> {
        let url = &worksheet.cells_url;
        let entries = self.fetch_entries(session, url, FeedKind::Cell).await?;

        entries
            .into_iter()
            .map(|entry| match entry {
                Entry::Cell { cell, .. } => Ok(cell),
                other => Err(unexpected_entry(url, FeedKind::Cell, &other)),
            })
            .collect()
    }

    /// Resolve a worksheet by spreadsheet and worksheet title and return its grid.
    ///
    /// Stops at the first failing stage; no partial grid is returned.
    pub async fn fetch_worksheet(
        &self,
        session: &S::Session,
        spreadsheet_title: &str,
        worksheet_title: &str,
    ) -> FeedResult<Grid> {
        let spreadsheet = self.find_spreadsheet(session, spreadsheet_title).await?;
        let worksheet = self
            .find_worksheet(session, &spreadsheet, worksheet_title)
            .await?;
        let cells = self.fetch_cells(session, &worksheet).await?;

        let grid = if self.config.sort_cells {
            reshape_sorted(cells)
        } else {
            reshape(cells)
        };

        info!(
            spreadsheet = spreadsheet_title,
            worksheet = worksheet_title,
            rows = grid.len(),
            "fetched worksheet"
        );
        Ok(grid)
    }

    async fn fetch_entries(
        &self,
        session: &S::Session,
        url: &str,
        kind: FeedKind,
    ) -> FeedResult<Vec<Entry>> {
        debug!(url, %kind, "listing feed");
        let entries = self.service.list_entries(session, url, kind).await?;
        debug!(url, %kind, count = entries.len(), "feed listed");
        Ok(entries)
    }
}

/// Return the only item matching `pred`, or the number of matches otherwise.
fn single_match<T>(items: Vec<T>, pred: impl Fn(&T) -> bool) -> Result<T, usize> {
    let mut matches: Vec<T> = items.into_iter().filter(|item| pred(item)).collect();
    if matches.len() == 1 {
        Ok(matches.remove(0))
    } else {
        Err(matches.len())
    }
}

fn unexpected_entry(url: &str, expected: FeedKind, entry: &Entry) -> FeedError {
    FeedError::malformed(
        url,
        format!(
            "expected {expected} entry, got {} entry '{}'",
            entry.kind(),
            entry.title()
        ),
    )
}
