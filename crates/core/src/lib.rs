//! # cellfeed-core
//!
//! Core types and the lookup pipeline for reading worksheets from a
//! spreadsheet feed service.
//!
//! This crate provides:
//! - Feed resource types and the [`Grid`] result type
//! - Error types
//! - The [`FeedService`] trait implemented by transports
//! - [`WorksheetFetcher`], which resolves titles and reshapes cells

/// Endpoint and client configuration.
pub mod config;
/// Error types and result aliases.
pub mod error;
/// The feed service trait.
pub mod feed;
/// Title-based lookup pipeline.
pub mod fetcher;
/// Cell list to grid reshaping.
pub mod grid;
/// Feed resource types.
pub mod model;

pub use config::FeedConfig;
pub use error::{FeedError, FeedResult};
pub use feed::FeedService;
pub use fetcher::WorksheetFetcher;
pub use grid::{reshape, reshape_sorted};
pub use model::{Cell, Entry, FeedKind, Grid, SpreadsheetRef, WorksheetRef};
