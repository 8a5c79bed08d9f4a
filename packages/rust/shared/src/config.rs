//! Application configuration for wikigraph.
//!
//! User config lives at `~/.wikigraph/wikigraph.toml`. The `NEO4J_URI`,
//! `NEO4J_USER`, and `NEO4J_PASSWORD` environment variables override config
//! file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WikigraphError};
use crate::types::DEFAULT_TOPICS;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "wikigraph.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".wikigraph";

/// Environment variables that override `[neo4j]` settings.
pub const ENV_NEO4J_URI: &str = "NEO4J_URI";
pub const ENV_NEO4J_USER: &str = "NEO4J_USER";
pub const ENV_NEO4J_PASSWORD: &str = "NEO4J_PASSWORD";

// ---------------------------------------------------------------------------
// Config structs (matching wikigraph.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Pipeline defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Wikipedia REST API settings.
    #[serde(default)]
    pub extract: ExtractConfig,

    /// Neo4j connection settings.
    #[serde(default)]
    pub neo4j: Neo4jConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Topics processed when none are given on the command line.
    #[serde(default = "default_topics")]
    pub topics: Vec<String>,

    /// Maximum concurrent per-topic pipelines (1 = sequential, in list order).
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            topics: default_topics(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_topics() -> Vec<String> {
    DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect()
}
fn default_concurrency() -> u32 {
    1
}

/// `[extract]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Base URL of the Wikipedia REST API.
    #[serde(default = "default_api_base")]
    pub base_url: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum extraction attempts per topic before the failure surfaces.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed backoff between attempts, in milliseconds.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

fn default_api_base() -> String {
    "https://en.wikipedia.org/api/rest_v1".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_attempts() -> u32 {
    3
}
fn default_backoff_ms() -> u64 {
    500
}

/// `[neo4j]` section. File values are overridden by the `NEO4J_*`
/// environment variables via [`Neo4jConfig::resolve`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neo4jConfig {
    /// Bolt URI of the Neo4j server.
    #[serde(default = "default_neo4j_uri")]
    pub uri: String,

    /// Username for basic auth.
    #[serde(default = "default_neo4j_user")]
    pub user: String,

    /// Password for basic auth.
    #[serde(default = "default_neo4j_password")]
    pub password: String,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: default_neo4j_uri(),
            user: default_neo4j_user(),
            password: default_neo4j_password(),
        }
    }
}

fn default_neo4j_uri() -> String {
    "bolt://localhost:7687".into()
}
fn default_neo4j_user() -> String {
    "neo4j".into()
}
fn default_neo4j_password() -> String {
    "password".into()
}

impl Neo4jConfig {
    /// Apply `NEO4J_URI` / `NEO4J_USER` / `NEO4J_PASSWORD` overrides on top
    /// of the file-or-default values. Empty env values are ignored.
    pub fn resolve(mut self) -> Self {
        if let Some(uri) = env_nonempty(ENV_NEO4J_URI) {
            self.uri = uri;
        }
        if let Some(user) = env_nonempty(ENV_NEO4J_USER) {
            self.user = user;
        }
        if let Some(password) = env_nonempty(ENV_NEO4J_PASSWORD) {
            self.password = password;
        }
        self
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(v) if !v.is_empty() => Some(v),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.wikigraph/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| WikigraphError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.wikigraph/wikigraph.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| WikigraphError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| WikigraphError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| WikigraphError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| WikigraphError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| WikigraphError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("bolt://localhost:7687"));
        assert!(toml_str.contains("en.wikipedia.org"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.extract.max_attempts, 3);
        assert_eq!(parsed.extract.timeout_secs, 30);
        assert_eq!(parsed.neo4j.user, "neo4j");
        assert_eq!(parsed.defaults.concurrency, 1);
    }

    #[test]
    fn default_topics_match_reference() {
        let config = AppConfig::default();
        assert_eq!(
            config.defaults.topics,
            vec![
                "artificial_intelligence",
                "machine_learning",
                "data_science"
            ]
        );
    }

    #[test]
    fn partial_file_fills_defaults() {
        let toml_str = r#"
[neo4j]
uri = "bolt://graph.internal:7687"

[defaults]
topics = ["rust_lang"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.neo4j.uri, "bolt://graph.internal:7687");
        assert_eq!(config.neo4j.user, "neo4j");
        assert_eq!(config.defaults.topics, vec!["rust_lang"]);
        assert_eq!(config.extract.backoff_ms, 500);
    }

    #[test]
    fn env_resolution_prefers_nonempty_vars() {
        // Unique var names would race with other tests if we used the real
        // NEO4J_* ones, so exercise the helper directly.
        assert_eq!(env_nonempty("WIKIGRAPH_TEST_UNSET_VAR_XYZ"), None);

        let resolved = Neo4jConfig::default().resolve();
        // With no env vars set, the defaults survive.
        assert!(!resolved.uri.is_empty());
        assert!(!resolved.user.is_empty());
    }
}
