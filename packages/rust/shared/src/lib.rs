//! Shared types, error model, and configuration for wikigraph.
//!
//! This crate is the foundation depended on by all other wikigraph crates.
//! It provides:
//! - [`WikigraphError`] — the unified error type
//! - Domain types ([`RawPage`], [`PageRecord`])
//! - Configuration ([`AppConfig`], [`Neo4jConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, ExtractConfig, Neo4jConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{Result, WikigraphError};
pub use types::{DEFAULT_TOPICS, PageRecord, RawPage};
