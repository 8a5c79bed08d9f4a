//! Core domain types for wikigraph page records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The three topics processed when none are supplied.
pub const DEFAULT_TOPICS: [&str; 3] = [
    "artificial_intelligence",
    "machine_learning",
    "data_science",
];

// ---------------------------------------------------------------------------
// RawPage
// ---------------------------------------------------------------------------

/// A page summary as extracted from the Wikipedia REST API, before
/// normalization. Every optional field in the API response is substituted
/// with its empty form here — absence alone never fails an extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    /// Page title (empty string if absent from the response).
    pub title: String,
    /// Summary extract text, untrimmed (empty string if absent).
    pub extract: String,
    /// Numeric Wikipedia page identifier (`None` if absent).
    pub page_id: Option<u64>,
    /// Canonical desktop URL (empty string if missing at any nesting level).
    pub url: String,
    /// When the extraction happened.
    pub extracted_at: DateTime<Utc>,
    /// The topic slug the summary was fetched for.
    pub topic: String,
}

// ---------------------------------------------------------------------------
// PageRecord
// ---------------------------------------------------------------------------

/// A normalized page record, as produced by the transformer and persisted
/// as a `:WikipediaPage` node keyed on `page_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Stable external identifier; the upsert key.
    pub page_id: String,
    /// Trimmed page title.
    pub title: String,
    /// Trimmed summary text.
    pub summary: String,
    /// Canonical link to the page.
    pub url: String,
    /// The query key used to fetch the page.
    pub topic: String,
    /// When the extraction happened (ISO-8601 in transit).
    pub extracted_at: DateTime<Utc>,
    /// Number of whitespace-delimited tokens in the raw extract text.
    pub word_count: usize,
}
