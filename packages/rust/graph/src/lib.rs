//! Neo4j storage layer.
//!
//! The [`GraphStore`] struct wraps a Bolt connection pool for page upserts
//! and the read-side queries ([`queries`]).
//!
//! Every statement runs in its own scoped session drawn from the pool and
//! released on all exit paths; concurrency safety of the single-statement
//! upsert is delegated to the store's own transaction guarantees.

pub mod queries;

use neo4rs::{Graph, query};
use tracing::{info, warn};

use wikigraph_shared::{Neo4jConfig, PageRecord, Result, WikigraphError};

pub use queries::GraphStats;

/// Cypher for the idempotent create-or-update of a page node, keyed on
/// `page_id`. `updated_at` is refreshed store-side on every write,
/// independent of `extracted_at`.
const UPSERT_PAGE: &str = "
MERGE (p:WikipediaPage {page_id: $page_id})
SET p.title = $title,
    p.summary = $summary,
    p.url = $url,
    p.topic = $topic,
    p.extracted_at = $extracted_at,
    p.word_count = $word_count,
    p.updated_at = datetime()
RETURN p.title AS title
";

/// Primary storage handle wrapping a Neo4j connection pool.
#[derive(Clone)]
pub struct GraphStore {
    graph: Graph,
}

impl GraphStore {
    /// Connect to Neo4j with the resolved configuration.
    ///
    /// Connection failure propagates as [`WikigraphError::Persistence`].
    pub async fn connect(config: &Neo4jConfig) -> Result<Self> {
        let graph = Graph::new(&config.uri, &config.user, &config.password)
            .await
            .map_err(|e| {
                WikigraphError::Persistence(format!("connection to {} failed: {e}", config.uri))
            })?;

        info!(uri = %config.uri, user = %config.user, "connected to Neo4j");
        Ok(Self { graph })
    }

    /// Upsert one normalized page record.
    ///
    /// Returns `true` when the statement returned a confirming row, `false`
    /// when the write executed but returned no row (logged as a warning, not
    /// a failure). Statement-execution failures propagate as
    /// [`WikigraphError::Persistence`].
    pub async fn upsert_page(&self, record: &PageRecord) -> Result<bool> {
        let q = query(UPSERT_PAGE)
            .param("page_id", record.page_id.as_str())
            .param("title", record.title.as_str())
            .param("summary", record.summary.as_str())
            .param("url", record.url.as_str())
            .param("topic", record.topic.as_str())
            .param("extracted_at", record.extracted_at.to_rfc3339())
            .param("word_count", record.word_count as i64);

        let mut rows = self
            .graph
            .execute(q)
            .await
            .map_err(|e| WikigraphError::Persistence(format!("upsert failed: {e}")))?;

        match rows
            .next()
            .await
            .map_err(|e| WikigraphError::Persistence(format!("upsert result read failed: {e}")))?
        {
            Some(row) => {
                let title: String = row.get("title").unwrap_or_default();
                info!(page_id = %record.page_id, %title, "loaded page");
                Ok(true)
            }
            None => {
                warn!(page_id = %record.page_id, "no record returned from Neo4j");
                Ok(false)
            }
        }
    }

    pub(crate) fn graph(&self) -> &Graph {
        &self.graph
    }
}
