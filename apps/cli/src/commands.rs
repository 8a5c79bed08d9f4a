//! CLI command definitions, routing, and tracing setup.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use wikigraph_core::pipeline::{
    PipelineConfig, PipelineReport, ProgressReporter, TopicOutcome, run_pipeline,
};
use wikigraph_extract::{RetryPolicy, SummaryClient};
use wikigraph_graph::GraphStore;
use wikigraph_shared::{AppConfig, PageRecord, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// wikigraph — Wikipedia summaries into a Neo4j knowledge graph.
#[derive(Parser)]
#[command(
    name = "wikigraph",
    version,
    about = "Extract Wikipedia page summaries and load them into Neo4j.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Running without a subcommand executes `run` with the default topics.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the ETL pipeline over a list of topics.
    Run {
        /// Topic slugs to process (defaults to the configured topic list).
        topics: Vec<String>,

        /// Record per-topic failures and keep processing instead of halting
        /// on the first unrecoverable error.
        #[arg(long)]
        keep_going: bool,

        /// Maximum concurrent per-topic pipelines (defaults to config).
        #[arg(long)]
        concurrency: Option<u32>,
    },

    /// Search stored pages by title/summary substring.
    Search {
        /// Term to search for.
        query: String,

        /// Maximum results.
        #[arg(short, long, default_value = "5")]
        limit: u32,
    },

    /// Show one stored page by page_id (or by title with --by-title).
    Page {
        /// page_id, or exact title when --by-title is set.
        identifier: String,

        /// Look the page up by title instead of page_id.
        #[arg(long)]
        by_title: bool,
    },

    /// List stored pages whose topic contains the given string.
    Topic {
        /// Topic substring.
        topic: String,

        /// Maximum results.
        #[arg(short, long, default_value = "5")]
        limit: u32,
    },

    /// Show total page count and distinct topics.
    Stats,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command.unwrap_or(Command::Run {
        topics: Vec::new(),
        keep_going: false,
        concurrency: None,
    }) {
        Command::Run {
            topics,
            keep_going,
            concurrency,
        } => cmd_run(topics, keep_going, concurrency).await,
        Command::Search { query, limit } => cmd_search(&query, limit).await,
        Command::Page {
            identifier,
            by_title,
        } => cmd_page(&identifier, by_title).await,
        Command::Topic { topic, limit } => cmd_topic(&topic, limit).await,
        Command::Stats => cmd_stats().await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Pipeline command
// ---------------------------------------------------------------------------

async fn cmd_run(
    topics: Vec<String>,
    keep_going: bool,
    concurrency: Option<u32>,
) -> Result<()> {
    let config = load_config()?;

    let pipeline_config = PipelineConfig {
        topics: if topics.is_empty() {
            config.defaults.topics.clone()
        } else {
            topics
        },
        retry: RetryPolicy::from(&config.extract),
        concurrency: concurrency.unwrap_or(config.defaults.concurrency).max(1) as usize,
        keep_going,
    };

    info!(
        topics = ?pipeline_config.topics,
        keep_going,
        "running wikigraph pipeline"
    );

    let client = Arc::new(SummaryClient::new(&config.extract)?);
    let store = Arc::new(connect_store(&config).await?);

    let reporter = CliProgress::new();
    let report = run_pipeline(&pipeline_config, client, store, &reporter).await?;

    println!();
    println!("  Pipeline completed!");
    println!("  Loaded:  {}", report.outcomes.len());
    for outcome in &report.outcomes {
        let confirmed = if outcome.loaded { "" } else { "  (unconfirmed)" };
        println!(
            "    {} -> {} ({} words){confirmed}",
            outcome.topic, outcome.title, outcome.word_count
        );
    }
    if !report.failures.is_empty() {
        println!("  Failed:  {}", report.failures.len());
        for (topic, error) in &report.failures {
            println!("    {topic}: {error}");
        }
    }
    println!("  Time:    {:.1}s", report.elapsed.as_secs_f64());
    println!();

    if !report.is_success() {
        return Err(eyre!(
            "{} topic(s) failed to load",
            report.failures.len()
        ));
    }
    Ok(())
}

async fn connect_store(config: &AppConfig) -> Result<GraphStore> {
    let neo4j = config.neo4j.clone().resolve();
    Ok(GraphStore::connect(&neo4j).await?)
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn topic_started(&self, topic: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Processing [{current}/{total}] {topic}"));
    }

    fn topic_done(&self, outcome: &TopicOutcome) {
        self.spinner
            .set_message(format!("Loaded {} ({})", outcome.title, outcome.topic));
    }

    fn done(&self, _report: &PipelineReport) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Query commands
// ---------------------------------------------------------------------------

async fn cmd_search(term: &str, limit: u32) -> Result<()> {
    let config = load_config()?;
    let store = connect_store(&config).await?;

    let pages = store.search(term, limit).await?;
    if pages.is_empty() {
        println!("no pages match '{term}'");
        return Ok(());
    }
    for page in &pages {
        print_page(page);
    }
    Ok(())
}

async fn cmd_page(identifier: &str, by_title: bool) -> Result<()> {
    let config = load_config()?;
    let store = connect_store(&config).await?;

    let page = if by_title {
        store.get_by_title(identifier).await?
    } else {
        store.get_by_page_id(identifier).await?
    };

    match page {
        Some(page) => {
            print_page(&page);
            Ok(())
        }
        None => Err(eyre!("no stored page matches '{identifier}'")),
    }
}

async fn cmd_topic(topic: &str, limit: u32) -> Result<()> {
    let config = load_config()?;
    let store = connect_store(&config).await?;

    let pages = store.search_by_topic(topic, limit).await?;
    if pages.is_empty() {
        println!("no pages stored for topic '{topic}'");
        return Ok(());
    }
    for page in &pages {
        print_page(page);
    }
    Ok(())
}

async fn cmd_stats() -> Result<()> {
    let config = load_config()?;
    let store = connect_store(&config).await?;

    let stats = store.stats().await?;
    println!("  Pages:  {}", stats.total_pages);
    println!("  Topics: {}", stats.topics.len());
    for topic in &stats.topics {
        println!("    {topic}");
    }
    Ok(())
}

fn print_page(page: &PageRecord) {
    println!("  {} [{}]", page.title, page.page_id);
    println!("    topic:     {}", page.topic);
    println!("    url:       {}", page.url);
    println!("    words:     {}", page.word_count);
    println!("    extracted: {}", page.extracted_at.to_rfc3339());
    println!("    {}", page.summary);
    println!();
}

// ---------------------------------------------------------------------------
// Config commands
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = wikigraph_shared::init_config()?;
    println!("wrote default config to {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let resolved_neo4j = config.neo4j.clone().resolve();

    println!("[defaults]");
    println!("topics      = {:?}", config.defaults.topics);
    println!("concurrency = {}", config.defaults.concurrency);
    println!();
    println!("[extract]");
    println!("base_url     = {}", config.extract.base_url);
    println!("timeout_secs = {}", config.extract.timeout_secs);
    println!("max_attempts = {}", config.extract.max_attempts);
    println!("backoff_ms   = {}", config.extract.backoff_ms);
    println!();
    println!("[neo4j]  (after NEO4J_* env overrides)");
    println!("uri  = {}", resolved_neo4j.uri);
    println!("user = {}", resolved_neo4j.user);
    println!("password = <hidden>");
    Ok(())
}
