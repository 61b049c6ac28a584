//! reqwest-backed feed service.

use std::time::Duration;

use async_trait::async_trait;
use cellfeed_core::{Entry, FeedConfig, FeedError, FeedKind, FeedResult, FeedService};
use reqwest::Client;
use tracing::debug;

use crate::atom::parse_feed;
use crate::credentials::ServiceAccountSession;

/// Protocol version header required by the spreadsheet feeds.
const GDATA_VERSION: &str = "3.0";

/// Fetches feeds over HTTPS using a service-account session.
#[derive(Debug, Clone)]
pub struct HttpFeedService {
    client: Client,
}

impl HttpFeedService {
    /// Build a service with the timeout and user agent from `config`.
    ///
    /// # Errors
    ///
    /// Returns a `FeedError::Config` if building the underlying HTTP client fails.
    pub fn new(config: &FeedConfig) -> FeedResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.application_name.as_str())
            .build()
            .map_err(|e| FeedError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Wrap an existing client, keeping whatever timeout, proxy and user-agent
    /// settings it was built with.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn get_feed(&self, session: &ServiceAccountSession, url: &str) -> FeedResult<String> {
        let token = session.access_token(&self.client).await?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header("GData-Version", GDATA_VERSION)
            .send()
            .await
            .map_err(|e| FeedError::http(url, e.status().map(|s| s.as_u16()), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::http(
                url,
                Some(status.as_u16()),
                format!(
                    "HTTP {} - {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| FeedError::http(url, Some(status.as_u16()), format!("failed to read body: {e}")))
    }
}

#[async_trait]
impl FeedService for HttpFeedService {
    type Session = ServiceAccountSession;

    async fn list_entries(
        &self,
        session: &ServiceAccountSession,
        url: &str,
        kind: FeedKind,
    ) -> FeedResult<Vec<Entry>> {
        let body = self.get_feed(session, url).await?;
        debug!(url, %kind, bytes = body.len(), "received feed");
        parse_feed(&body, url, kind)
    }
}
