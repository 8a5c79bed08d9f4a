//! Read-side queries over the page graph.
//!
//! These back the CLI's `search`, `page`, `topic`, and `stats` subcommands.
//! Each query is a single parameterized statement in its own scoped session.

use chrono::{DateTime, Utc};
use neo4rs::{Row, query};

use wikigraph_shared::{PageRecord, Result, WikigraphError};

use crate::GraphStore;

/// Columns returned by every page-reading query, aliased to the record's
/// field names.
const PAGE_COLUMNS: &str = "p.page_id AS page_id, p.title AS title, p.summary AS summary, \
     p.url AS url, p.topic AS topic, p.word_count AS word_count, p.extracted_at AS extracted_at";

/// Aggregate counts for the stored graph.
#[derive(Debug, Clone)]
pub struct GraphStats {
    /// Total number of stored page nodes.
    pub total_pages: u64,
    /// Distinct topics, sorted.
    pub topics: Vec<String>,
}

impl GraphStore {
    /// Substring search over titles and summaries.
    pub async fn search(&self, term: &str, limit: u32) -> Result<Vec<PageRecord>> {
        let cypher = format!(
            "MATCH (p:WikipediaPage) \
             WHERE p.title CONTAINS $term OR p.summary CONTAINS $term \
             RETURN {PAGE_COLUMNS} LIMIT $limit"
        );
        self.fetch_pages(query(&cypher).param("term", term).param("limit", limit as i64))
            .await
    }

    /// Look up a single page by its `page_id`.
    pub async fn get_by_page_id(&self, page_id: &str) -> Result<Option<PageRecord>> {
        let cypher = format!(
            "MATCH (p:WikipediaPage {{page_id: $page_id}}) RETURN {PAGE_COLUMNS}"
        );
        let pages = self
            .fetch_pages(query(&cypher).param("page_id", page_id))
            .await?;
        Ok(pages.into_iter().next())
    }

    /// Look up a single page by exact title, case-insensitively.
    pub async fn get_by_title(&self, title: &str) -> Result<Option<PageRecord>> {
        let cypher = format!(
            "MATCH (p:WikipediaPage) \
             WHERE toLower(p.title) = toLower($title) \
             RETURN {PAGE_COLUMNS}"
        );
        let pages = self
            .fetch_pages(query(&cypher).param("title", title))
            .await?;
        Ok(pages.into_iter().next())
    }

    /// Pages whose topic contains the given string.
    pub async fn search_by_topic(&self, topic: &str, limit: u32) -> Result<Vec<PageRecord>> {
        let cypher = format!(
            "MATCH (p:WikipediaPage) \
             WHERE p.topic CONTAINS $topic \
             RETURN {PAGE_COLUMNS} LIMIT $limit"
        );
        self.fetch_pages(query(&cypher).param("topic", topic).param("limit", limit as i64))
            .await
    }

    /// Total page count and the distinct topics stored.
    pub async fn stats(&self) -> Result<GraphStats> {
        let mut rows = self
            .graph()
            .execute(query("MATCH (p:WikipediaPage) RETURN count(p) AS total"))
            .await
            .map_err(persistence)?;

        let total_pages = match rows.next().await.map_err(persistence)? {
            Some(row) => row.get::<i64>("total").map_err(persistence)?.max(0) as u64,
            None => 0,
        };

        let mut rows = self
            .graph()
            .execute(query(
                "MATCH (p:WikipediaPage) RETURN DISTINCT p.topic AS topic ORDER BY topic",
            ))
            .await
            .map_err(persistence)?;

        let mut topics = Vec::new();
        while let Some(row) = rows.next().await.map_err(persistence)? {
            topics.push(row.get::<String>("topic").map_err(persistence)?);
        }

        Ok(GraphStats {
            total_pages,
            topics,
        })
    }

    async fn fetch_pages(&self, q: neo4rs::Query) -> Result<Vec<PageRecord>> {
        let mut rows = self.graph().execute(q).await.map_err(persistence)?;

        let mut pages = Vec::new();
        while let Some(row) = rows.next().await.map_err(persistence)? {
            pages.push(record_from_row(&row)?);
        }
        Ok(pages)
    }
}

fn persistence(e: impl std::fmt::Display) -> WikigraphError {
    WikigraphError::Persistence(e.to_string())
}

/// Rehydrate a [`PageRecord`] from an aliased result row.
fn record_from_row(row: &Row) -> Result<PageRecord> {
    let extracted_at: String = row.get("extracted_at").map_err(persistence)?;
    let extracted_at = extracted_at
        .parse::<DateTime<Utc>>()
        .map_err(|e| persistence(format!("invalid extracted_at '{extracted_at}': {e}")))?;

    Ok(PageRecord {
        page_id: row.get("page_id").map_err(persistence)?,
        title: row.get("title").map_err(persistence)?,
        summary: row.get("summary").map_err(persistence)?,
        url: row.get("url").map_err(persistence)?,
        topic: row.get("topic").map_err(persistence)?,
        extracted_at,
        word_count: row.get::<i64>("word_count").map_err(persistence)?.max(0) as usize,
    })
}
