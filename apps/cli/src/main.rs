//! wikigraph CLI — Wikipedia summary ETL into a Neo4j knowledge graph.
//!
//! Extracts page summaries from the Wikipedia REST API, normalizes them,
//! and upserts them as `:WikipediaPage` nodes.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
