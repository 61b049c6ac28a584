//! Lookup pipeline tests against an in-memory feed service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use cellfeed_core::{
    Cell, Entry, FeedConfig, FeedError, FeedKind, FeedResult, FeedService, SpreadsheetRef,
    WorksheetFetcher, WorksheetRef,
};

const LIST_URL: &str = "mem://spreadsheets";

/// Session token the in-memory service expects.
struct Session(&'static str);

/// Serves canned feeds keyed by URL and counts requests.
#[derive(Default)]
struct MemoryFeeds {
    feeds: HashMap<String, Vec<Entry>>,
    requests: AtomicUsize,
}

impl MemoryFeeds {
    fn with_feed(mut self, url: &str, entries: Vec<Entry>) -> Self {
        self.feeds.insert(url.to_string(), entries);
        self
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedService for MemoryFeeds {
    type Session = Session;

    async fn list_entries(
        &self,
        session: &Session,
        url: &str,
        _kind: FeedKind,
    ) -> FeedResult<Vec<Entry>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if session.0 != "valid" {
            return Err(FeedError::http(url, Some(401), "Unauthorized"));
        }
        self.feeds
            .get(url)
            .cloned()
            .ok_or_else(|| FeedError::http(url, Some(404), "Not Found"))
    }
}

fn spreadsheet(title: &str, key: &str) -> Entry {
    Entry::Spreadsheet(SpreadsheetRef::new(title, format!("mem://{key}/worksheets")))
}

fn worksheet(title: &str, key: &str, sheet: &str) -> Entry {
    Entry::Worksheet(WorksheetRef::new(title, format!("mem://{key}/{sheet}/cells")))
}

fn cell(row: u32, col: u32, value: &str) -> Entry {
    Entry::Cell {
        title: format!("R{row}C{col}"),
        cell: Cell::new(row, col, value),
    }
}

fn colour_counts_feeds() -> MemoryFeeds {
    MemoryFeeds::default()
        .with_feed(
            LIST_URL,
            vec![
                spreadsheet("Budget", "k1"),
                spreadsheet("Colour Counts", "k2"),
                spreadsheet("colour counts", "k3"),
            ],
        )
        .with_feed(
            "mem://k2/worksheets",
            vec![worksheet("Sheet1", "k2", "od6"), worksheet("Notes", "k2", "od7")],
        )
        .with_feed(
            "mem://k2/od6/cells",
            vec![
                cell(1, 1, "Colour"),
                cell(1, 2, "Count"),
                cell(2, 1, "red"),
                cell(2, 2, "123"),
            ],
        )
}

fn fetcher(feeds: MemoryFeeds) -> WorksheetFetcher<MemoryFeeds> {
    WorksheetFetcher::new(
        feeds,
        FeedConfig::default().with_spreadsheets_url(LIST_URL),
    )
}

const SESSION: Session = Session("valid");

#[tokio::test]
async fn test_list_spreadsheets_keeps_feed_order() {
    let fetcher = fetcher(colour_counts_feeds());
    let titles: Vec<String> = fetcher
        .list_spreadsheets(&SESSION)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.title)
        .collect();
    assert_eq!(titles, vec!["Budget", "Colour Counts", "colour counts"]);
}

#[tokio::test]
async fn test_find_spreadsheet_unique_match() {
    let fetcher = fetcher(colour_counts_feeds());
    let found = fetcher
        .find_spreadsheet(&SESSION, "Colour Counts")
        .await
        .unwrap();
    assert_eq!(found.worksheets_url, "mem://k2/worksheets");
}

#[tokio::test]
async fn test_find_spreadsheet_no_match() {
    let fetcher = fetcher(colour_counts_feeds());
    let err = fetcher
        .find_spreadsheet(&SESSION, "Missing")
        .await
        .unwrap_err();
    assert!(matches!(&err, FeedError::SpreadsheetNotFound { title } if title == "Missing"));
    assert_eq!(err.to_string(), "Found 0 spreadsheets with name Missing");
}

#[tokio::test]
async fn test_find_spreadsheet_duplicate_titles() {
    let feeds = MemoryFeeds::default().with_feed(
        LIST_URL,
        vec![
            spreadsheet("Colour Counts", "k1"),
            spreadsheet("Budget", "k2"),
            spreadsheet("Colour Counts", "k3"),
        ],
    );
    let err = fetcher(feeds)
        .find_spreadsheet(&SESSION, "Colour Counts")
        .await
        .unwrap_err();
    assert!(matches!(
        &err,
        FeedError::AmbiguousSpreadsheet { title, count: 2 } if title == "Colour Counts"
    ));
    assert_eq!(err.to_string(), "Found 2 spreadsheets with name Colour Counts");
}

#[tokio::test]
async fn test_find_worksheet_zero_one_many() {
    let feeds = colour_counts_feeds().with_feed(
        "mem://k1/worksheets",
        vec![worksheet("Sheet1", "k1", "a"), worksheet("Sheet1", "k1", "b")],
    );
    let fetcher = fetcher(feeds);

    let colours = SpreadsheetRef::new("Colour Counts", "mem://k2/worksheets");
    let found = fetcher
        .find_worksheet(&SESSION, &colours, "Notes")
        .await
        .unwrap();
    assert_eq!(found.cells_url, "mem://k2/od7/cells");

    let err = fetcher
        .find_worksheet(&SESSION, &colours, "notes")
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let budget = SpreadsheetRef::new("Budget", "mem://k1/worksheets");
    let err = fetcher
        .find_worksheet(&SESSION, &budget, "Sheet1")
        .await
        .unwrap_err();
    assert!(err.is_ambiguous());
    assert_eq!(err.match_count(), Some(2));
    assert_eq!(
        err.to_string(),
        "Found 2 worksheets with name Sheet1 in spreadsheet Budget"
    );
}

#[tokio::test]
async fn test_fetch_worksheet_grid() {
    let fetcher = fetcher(colour_counts_feeds());
    let grid = fetcher
        .fetch_worksheet(&SESSION, "Colour Counts", "Sheet1")
        .await
        .unwrap();
    assert_eq!(grid, vec![vec!["Colour", "Count"], vec!["red", "123"]]);
    assert_eq!(fetcher.service().requests(), 3);
}

#[tokio::test]
async fn test_fetch_worksheet_missing_worksheet_names_both_titles() {
    let feeds = colour_counts_feeds().with_feed(
        "mem://k2/worksheets",
        vec![worksheet("Notes", "k2", "od7")],
    );
    let fetcher = fetcher(feeds);
    let err = fetcher
        .fetch_worksheet(&SESSION, "Colour Counts", "Sheet1")
        .await
        .unwrap_err();

    match &err {
        FeedError::WorksheetNotFound { spreadsheet, title } => {
            assert_eq!(spreadsheet, "Colour Counts");
            assert_eq!(title, "Sheet1");
        }
        other => panic!("Expected WorksheetNotFound, got {other:?}"),
    }
    // The cell feed is never requested
    assert_eq!(fetcher.service().requests(), 2);
}

#[tokio::test]
async fn test_fetch_worksheet_stops_at_spreadsheet_lookup() {
    let fetcher = fetcher(colour_counts_feeds());
    let err = fetcher
        .fetch_worksheet(&SESSION, "Nope", "Sheet1")
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::SpreadsheetNotFound { .. }));
    assert_eq!(fetcher.service().requests(), 1);
}

#[tokio::test]
async fn test_upstream_errors_pass_through() {
    let fetcher = fetcher(colour_counts_feeds());
    let err = fetcher
        .fetch_worksheet(&Session("expired"), "Colour Counts", "Sheet1")
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::Http { status: Some(401), .. }));
}

#[tokio::test]
async fn test_wrong_entry_kind_is_malformed() {
    let feeds = MemoryFeeds::default().with_feed(LIST_URL, vec![cell(1, 1, "stray")]);
    let err = fetcher(feeds)
        .list_spreadsheets(&SESSION)
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::MalformedFeed { .. }));
    assert!(err.is_upstream());
}

#[tokio::test]
async fn test_sort_cells_option() {
    let feeds = colour_counts_feeds().with_feed(
        "mem://k2/od6/cells",
        vec![
            cell(2, 2, "123"),
            cell(1, 1, "Colour"),
            cell(2, 1, "red"),
            cell(1, 2, "Count"),
        ],
    );
    let fetcher = WorksheetFetcher::new(
        feeds,
        FeedConfig::default()
            .with_spreadsheets_url(LIST_URL)
            .with_sort_cells(true),
    );
    let grid = fetcher
        .fetch_worksheet(&SESSION, "Colour Counts", "Sheet1")
        .await
        .unwrap();
    assert_eq!(grid, vec![vec!["Colour", "Count"], vec!["red", "123"]]);
}

#[tokio::test]
async fn test_empty_worksheet() {
    let feeds = colour_counts_feeds().with_feed("mem://k2/od6/cells", Vec::new());
    let grid = fetcher(feeds)
        .fetch_worksheet(&SESSION, "Colour Counts", "Sheet1")
        .await
        .unwrap();
    assert!(grid.is_empty());
}
