//! Round-trip tests against a live Neo4j instance.
//!
//! Run with `cargo test -p wikigraph-graph -- --ignored` and the `NEO4J_*`
//! environment variables pointing at a disposable database.

use chrono::Utc;
use wikigraph_graph::GraphStore;
use wikigraph_shared::{Neo4jConfig, PageRecord};

fn test_record(page_id: &str, title: &str) -> PageRecord {
    PageRecord {
        page_id: page_id.into(),
        title: title.into(),
        summary: "A field of study.".into(),
        url: format!("http://x/{title}"),
        topic: "wikigraph_test".into(),
        extracted_at: Utc::now(),
        word_count: 4,
    }
}

async fn connect() -> GraphStore {
    GraphStore::connect(&Neo4jConfig::default().resolve())
        .await
        .expect("Neo4j must be reachable")
}

#[tokio::test]
#[ignore = "requires a running Neo4j"]
async fn upsert_twice_keeps_one_node_with_latest_title() {
    let store = connect().await;

    let confirmed = store
        .upsert_page(&test_record("wg-test-1", "First title"))
        .await
        .expect("first upsert");
    assert!(confirmed);

    let confirmed = store
        .upsert_page(&test_record("wg-test-1", "Second title"))
        .await
        .expect("second upsert");
    assert!(confirmed);

    let page = store
        .get_by_page_id("wg-test-1")
        .await
        .expect("read back")
        .expect("node exists");
    assert_eq!(page.title, "Second title");

    let matches = store
        .search_by_topic("wikigraph_test", 10)
        .await
        .expect("topic search");
    assert_eq!(
        matches.iter().filter(|p| p.page_id == "wg-test-1").count(),
        1
    );
}

#[tokio::test]
#[ignore = "requires a running Neo4j"]
async fn stats_count_stored_pages() {
    let store = connect().await;

    store
        .upsert_page(&test_record("wg-test-2", "Stats page"))
        .await
        .expect("upsert");

    let stats = store.stats().await.expect("stats");
    assert!(stats.total_pages >= 1);
    assert!(stats.topics.iter().any(|t| t == "wikigraph_test"));
}
