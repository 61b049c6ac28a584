//! # cellfeed-http
//!
//! HTTP feed service for cellfeed.
//!
//! This crate provides service-account authentication ([`obtain_session`]) and
//! [`HttpFeedService`], which reads spreadsheet, worksheet and cell feeds over
//! HTTPS and decodes their Atom entries.
//!
//! ```no_run
//! use cellfeed_core::{FeedConfig, WorksheetFetcher};
//! use cellfeed_http::{obtain_session, HttpFeedService};
//!
//! # async fn run() -> cellfeed_core::FeedResult<()> {
//! let config = FeedConfig::default();
//! let session = obtain_session(std::fs::File::open("service-account.json")?, &config.scope)?;
//! let fetcher = WorksheetFetcher::new(HttpFeedService::new(&config)?, config);
//! let grid = fetcher.fetch_worksheet(&session, "Colour Counts", "Sheet1").await?;
//! # let _ = grid;
//! # Ok(())
//! # }
//! ```

pub mod atom;
pub mod credentials;
pub mod service;

pub use credentials::{obtain_session, ServiceAccountKey, ServiceAccountSession};
pub use service::HttpFeedService;
