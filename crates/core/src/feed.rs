//! The feed service seam.

use async_trait::async_trait;

use crate::error::FeedResult;
use crate::model::{Entry, FeedKind};

/// Authenticated access to spreadsheet, worksheet and cell feeds.
///
/// Implementations own transport, authentication and feed decoding. Every
/// failure they report is passed to the caller unchanged.
#[async_trait]
pub trait FeedService: Send + Sync {
    /// Authenticated handle passed to every request.
    type Session: Send + Sync;

    /// Fetch the feed at `url` and return its entries in delivery order.
    ///
    /// Entries are expected to be of `kind`; callers treat anything else as a
    /// malformed feed.
    async fn list_entries(
        &self,
        session: &Self::Session,
        url: &str,
        kind: FeedKind,
    ) -> FeedResult<Vec<Entry>>;
}
