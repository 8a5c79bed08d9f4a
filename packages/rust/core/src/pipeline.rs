//! End-to-end ETL pipeline: topic list → extract → transform → load.
//!
//! Topics are independent of one another. The default runs them
//! sequentially in list order; `concurrency > 1` fans the per-topic
//! pipelines out over a bounded set of tasks with no ordering guarantee and
//! no shared mutable state between them.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, instrument, warn};

use wikigraph_extract::{RetryPolicy, SummaryClient, fetch_with_retry};
use wikigraph_graph::GraphStore;
use wikigraph_shared::{DEFAULT_TOPICS, PageRecord, Result, WikigraphError};

// ---------------------------------------------------------------------------
// Configuration & results
// ---------------------------------------------------------------------------

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Topics to process, in order.
    pub topics: Vec<String>,
    /// Retry policy applied to the extraction call only.
    pub retry: RetryPolicy,
    /// Maximum concurrent per-topic pipelines (1 = sequential).
    pub concurrency: usize,
    /// When `true`, a failing topic is recorded and the remaining topics
    /// still run. When `false` (the reference behavior), the first
    /// unrecoverable failure halts the whole run.
    pub keep_going: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            topics: DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect(),
            retry: RetryPolicy::default(),
            concurrency: 1,
            keep_going: false,
        }
    }
}

/// Result of one topic's extract → transform → load sequence.
#[derive(Debug, Clone)]
pub struct TopicOutcome {
    /// The topic that was processed.
    pub topic: String,
    /// Normalized page title.
    pub title: String,
    /// The upsert key that was written.
    pub page_id: String,
    /// Word count of the stored summary.
    pub word_count: usize,
    /// Whether the store returned a confirming row for the write.
    pub loaded: bool,
}

/// Summary of a completed pipeline run.
#[derive(Debug)]
pub struct PipelineReport {
    /// Successfully processed topics.
    pub outcomes: Vec<TopicOutcome>,
    /// Topics that failed, with their errors (only populated in
    /// keep-going mode; fail-fast surfaces the error instead).
    pub failures: Vec<(String, WikigraphError)>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

impl PipelineReport {
    /// `true` when every topic loaded without error.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Seams
// ---------------------------------------------------------------------------

/// Destination for normalized page records.
///
/// [`GraphStore`] is the production implementation; tests substitute an
/// in-memory sink.
pub trait PageSink: Send + Sync {
    /// Create-or-update the record keyed on `page_id`. Returns `true` when
    /// the store confirmed the write with a row.
    fn upsert_page(
        &self,
        record: &PageRecord,
    ) -> impl Future<Output = Result<bool>> + Send;
}

impl PageSink for GraphStore {
    async fn upsert_page(&self, record: &PageRecord) -> Result<bool> {
        GraphStore::upsert_page(self, record).await
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called before a topic's pipeline starts.
    fn topic_started(&self, topic: &str, current: usize, total: usize);
    /// Called when a topic's pipeline completes.
    fn topic_done(&self, outcome: &TopicOutcome);
    /// Called when the whole run completes.
    fn done(&self, report: &PipelineReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn topic_started(&self, _topic: &str, _current: usize, _total: usize) {}
    fn topic_done(&self, _outcome: &TopicOutcome) {}
    fn done(&self, _report: &PipelineReport) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the pipeline over `config.topics`.
///
/// In fail-fast mode (the default) the first topic whose retries are
/// exhausted halts the remaining topics and the error propagates. In
/// keep-going mode every topic runs and per-topic errors are collected in
/// the report.
#[instrument(skip_all, fields(topics = config.topics.len(), concurrency = config.concurrency))]
pub async fn run_pipeline<S>(
    config: &PipelineConfig,
    client: Arc<SummaryClient>,
    sink: Arc<S>,
    progress: &dyn ProgressReporter,
) -> Result<PipelineReport>
where
    S: PageSink + 'static,
{
    let start = Instant::now();
    info!(topics = ?config.topics, "starting wikigraph pipeline");

    let report = if config.concurrency > 1 {
        run_concurrent(config, client, sink, progress, start).await?
    } else {
        run_sequential(config, client, sink, progress, start).await?
    };

    progress.done(&report);
    info!(
        loaded = report.outcomes.len(),
        failed = report.failures.len(),
        elapsed_ms = report.elapsed.as_millis(),
        "pipeline completed"
    );

    Ok(report)
}

async fn run_sequential<S: PageSink>(
    config: &PipelineConfig,
    client: Arc<SummaryClient>,
    sink: Arc<S>,
    progress: &dyn ProgressReporter,
    start: Instant,
) -> Result<PipelineReport> {
    let total = config.topics.len();
    let mut outcomes = Vec::with_capacity(total);
    let mut failures = Vec::new();

    for (i, topic) in config.topics.iter().enumerate() {
        progress.topic_started(topic, i + 1, total);

        match run_topic(topic, &client, sink.as_ref(), &config.retry).await {
            Ok(outcome) => {
                progress.topic_done(&outcome);
                outcomes.push(outcome);
            }
            Err(e) if config.keep_going => {
                warn!(topic, error = %e, "topic failed, continuing");
                failures.push((topic.clone(), e));
            }
            Err(e) => return Err(e),
        }
    }

    Ok(PipelineReport {
        outcomes,
        failures,
        elapsed: start.elapsed(),
    })
}

async fn run_concurrent<S>(
    config: &PipelineConfig,
    client: Arc<SummaryClient>,
    sink: Arc<S>,
    progress: &dyn ProgressReporter,
    start: Instant,
) -> Result<PipelineReport>
where
    S: PageSink + 'static,
{
    let total = config.topics.len();
    let semaphore = Arc::new(Semaphore::new(config.concurrency));
    let mut tasks = JoinSet::new();

    for (i, topic) in config.topics.iter().cloned().enumerate() {
        progress.topic_started(&topic, i + 1, total);

        let client = client.clone();
        let sink = sink.clone();
        let retry = config.retry.clone();
        let sem = semaphore.clone();

        tasks.spawn(async move {
            let _permit = sem
                .acquire()
                .await
                .map_err(|e| {
                    (
                        topic.clone(),
                        WikigraphError::validation(format!("semaphore closed: {e}")),
                    )
                })?;
            let outcome = run_topic(&topic, &client, sink.as_ref(), &retry).await;
            outcome.map_err(|e| (topic, e))
        });
    }

    let mut outcomes = Vec::with_capacity(total);
    let mut failures = Vec::new();

    while let Some(joined) = tasks.join_next().await {
        let task_result = joined
            .map_err(|e| WikigraphError::validation(format!("pipeline task panicked: {e}")))?;

        match task_result {
            Ok(outcome) => {
                progress.topic_done(&outcome);
                outcomes.push(outcome);
            }
            Err((topic, e)) if config.keep_going => {
                warn!(topic, error = %e, "topic failed, continuing");
                failures.push((topic, e));
            }
            Err((_, e)) => {
                tasks.abort_all();
                return Err(e);
            }
        }
    }

    Ok(PipelineReport {
        outcomes,
        failures,
        elapsed: start.elapsed(),
    })
}

/// One topic's pipeline: extract (with retry) → normalize → upsert.
#[instrument(skip(client, sink, retry))]
async fn run_topic<S: PageSink + ?Sized>(
    topic: &str,
    client: &SummaryClient,
    sink: &S,
    retry: &RetryPolicy,
) -> Result<TopicOutcome> {
    let raw = fetch_with_retry(client, topic, retry).await?;
    let record = wikigraph_transform::normalize(&raw);
    let loaded = sink.upsert_page(&record).await?;

    Ok(TopicOutcome {
        topic: topic.to_string(),
        title: record.title,
        page_id: record.page_id,
        word_count: record.word_count,
        loaded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration as StdDuration;

    use wikigraph_shared::ExtractConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// In-memory sink keyed on `page_id`, mirroring the store's upsert
    /// semantics.
    struct MemorySink {
        pages: Mutex<HashMap<String, PageRecord>>,
        confirm: bool,
        fail: bool,
    }

    impl MemorySink {
        fn new() -> Self {
            Self {
                pages: Mutex::new(HashMap::new()),
                confirm: true,
                fail: false,
            }
        }

        fn unconfirmed() -> Self {
            Self {
                confirm: false,
                ..Self::new()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }

        fn stored(&self) -> HashMap<String, PageRecord> {
            self.pages.lock().expect("lock").clone()
        }
    }

    impl PageSink for MemorySink {
        async fn upsert_page(&self, record: &PageRecord) -> Result<bool> {
            if self.fail {
                return Err(WikigraphError::Persistence("write refused".into()));
            }
            self.pages
                .lock()
                .expect("lock")
                .insert(record.page_id.clone(), record.clone());
            Ok(self.confirm)
        }
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            backoff: StdDuration::ZERO,
        }
    }

    async fn mock_topic(server: &MockServer, topic: &str, pageid: u64, title: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/page/summary/{topic}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "title": title,
                "extract": "A field of study.",
                "pageid": pageid,
                "content_urls": {"desktop": {"page": format!("http://x/{title}")}}
            })))
            .mount(server)
            .await;
    }

    fn client_for(server: &MockServer) -> Arc<SummaryClient> {
        Arc::new(
            SummaryClient::new(&ExtractConfig {
                base_url: server.uri(),
                ..ExtractConfig::default()
            })
            .expect("client"),
        )
    }

    fn config(topics: &[&str]) -> PipelineConfig {
        PipelineConfig {
            topics: topics.iter().map(|t| t.to_string()).collect(),
            retry: fast_retry(),
            concurrency: 1,
            keep_going: false,
        }
    }

    #[tokio::test]
    async fn processes_topics_in_order() {
        let server = MockServer::start().await;
        mock_topic(&server, "artificial_intelligence", 123, "AI").await;
        mock_topic(&server, "machine_learning", 456, "Machine learning").await;

        let sink = Arc::new(MemorySink::new());
        let report = run_pipeline(
            &config(&["artificial_intelligence", "machine_learning"]),
            client_for(&server),
            sink.clone(),
            &SilentProgress,
        )
        .await
        .expect("pipeline");

        assert!(report.is_success());
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.outcomes[0].topic, "artificial_intelligence");
        assert_eq!(report.outcomes[1].topic, "machine_learning");

        let stored = sink.stored();
        assert_eq!(stored["123"].title, "AI");
        assert_eq!(stored["123"].word_count, 4);
        assert_eq!(stored["456"].topic, "machine_learning");
    }

    #[tokio::test]
    async fn fail_fast_halts_remaining_topics_before_load() {
        let server = MockServer::start().await;

        // First topic 404s on every attempt; second topic is valid but must
        // never be reached.
        Mock::given(method("GET"))
            .and(path("/page/summary/broken_topic"))
            .respond_with(ResponseTemplate::new(404))
            .expect(3)
            .mount(&server)
            .await;
        mock_topic(&server, "machine_learning", 456, "Machine learning").await;

        let sink = Arc::new(MemorySink::new());
        let err = run_pipeline(
            &config(&["broken_topic", "machine_learning"]),
            client_for(&server),
            sink.clone(),
            &SilentProgress,
        )
        .await
        .expect_err("must halt");

        assert!(matches!(err, WikigraphError::Fetch(_)));
        // The loader never ran for any topic.
        assert!(sink.stored().is_empty());
        server.verify().await;
    }

    #[tokio::test]
    async fn keep_going_isolates_failing_topics() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/page/summary/broken_topic"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mock_topic(&server, "data_science", 789, "Data science").await;

        let sink = Arc::new(MemorySink::new());
        let mut cfg = config(&["broken_topic", "data_science"]);
        cfg.keep_going = true;

        let report = run_pipeline(&cfg, client_for(&server), sink.clone(), &SilentProgress)
            .await
            .expect("keep-going run returns a report");

        assert!(!report.is_success());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "broken_topic");
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(sink.stored()["789"].title, "Data science");
    }

    #[tokio::test]
    async fn unconfirmed_write_is_not_a_failure() {
        let server = MockServer::start().await;
        mock_topic(&server, "artificial_intelligence", 123, "AI").await;

        let sink = Arc::new(MemorySink::unconfirmed());
        let report = run_pipeline(
            &config(&["artificial_intelligence"]),
            client_for(&server),
            sink,
            &SilentProgress,
        )
        .await
        .expect("pipeline continues");

        assert!(report.is_success());
        assert!(!report.outcomes[0].loaded);
    }

    #[tokio::test]
    async fn load_failures_propagate() {
        let server = MockServer::start().await;
        mock_topic(&server, "artificial_intelligence", 123, "AI").await;

        let sink = Arc::new(MemorySink::failing());
        let err = run_pipeline(
            &config(&["artificial_intelligence"]),
            client_for(&server),
            sink,
            &SilentProgress,
        )
        .await
        .expect_err("persistence errors surface");

        assert!(matches!(err, WikigraphError::Persistence(_)));
    }

    #[tokio::test]
    async fn concurrent_fanout_loads_every_topic() {
        let server = MockServer::start().await;
        mock_topic(&server, "artificial_intelligence", 123, "AI").await;
        mock_topic(&server, "machine_learning", 456, "Machine learning").await;
        mock_topic(&server, "data_science", 789, "Data science").await;

        let sink = Arc::new(MemorySink::new());
        let mut cfg = config(&[
            "artificial_intelligence",
            "machine_learning",
            "data_science",
        ]);
        cfg.concurrency = 3;

        let report = run_pipeline(&cfg, client_for(&server), sink.clone(), &SilentProgress)
            .await
            .expect("pipeline");

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(sink.stored().len(), 3);
    }
}
