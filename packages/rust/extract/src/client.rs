//! HTTP client for the Wikipedia REST summary endpoint.

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use wikigraph_shared::{ExtractConfig, RawPage, Result, WikigraphError};

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("wikigraph/", env!("CARGO_PKG_VERSION"));

/// Client for the `page/summary/{topic}` endpoint of the Wikipedia REST API.
pub struct SummaryClient {
    client: Client,
    base_url: String,
}

impl SummaryClient {
    /// Build a client with the configured base URL and request timeout.
    pub fn new(config: &ExtractConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WikigraphError::Fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the summary document for one topic.
    ///
    /// The topic is used verbatim as a path segment; no validation is
    /// performed on its character set. A non-success status or transport
    /// failure maps to [`WikigraphError::Fetch`]. Optional response fields
    /// are substituted with their empty forms — a missing `title`,
    /// `extract`, `pageid`, or desktop URL never fails the extraction.
    pub async fn fetch_summary(&self, topic: &str) -> Result<RawPage> {
        let url = format!("{}/page/summary/{topic}", self.base_url);
        debug!(%url, topic, "fetching summary");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| WikigraphError::Fetch(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WikigraphError::Fetch(format!("{url}: HTTP {status}")));
        }

        let body: SummaryResponse = response
            .json()
            .await
            .map_err(|e| WikigraphError::Fetch(format!("{url}: body decode failed: {e}")))?;

        Ok(body.into_raw_page(topic))
    }
}

// ---------------------------------------------------------------------------
// Response shape
// ---------------------------------------------------------------------------

/// The subset of the summary endpoint's JSON response we consume.
/// Every field is optional in the wire format.
#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    pageid: Option<u64>,
    #[serde(default)]
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    #[serde(default)]
    desktop: Option<PlatformUrls>,
}

#[derive(Debug, Deserialize)]
struct PlatformUrls {
    #[serde(default)]
    page: Option<String>,
}

impl SummaryResponse {
    fn into_raw_page(self, topic: &str) -> RawPage {
        RawPage {
            title: self.title.unwrap_or_default(),
            extract: self.extract.unwrap_or_default(),
            page_id: self.pageid,
            url: self
                .content_urls
                .and_then(|c| c.desktop)
                .and_then(|d| d.page)
                .unwrap_or_default(),
            extracted_at: Utc::now(),
            topic: topic.to_string(),
        }
    }
}
