//! Bounded retry wrapper around extraction calls.

use std::time::Duration;

use tracing::warn;

use wikigraph_shared::{ExtractConfig, RawPage, Result};

use crate::client::SummaryClient;

/// Retry policy for extraction: a fixed attempt bound with a fixed backoff
/// between attempts. Transformation and load are never retried.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts before the last error surfaces (minimum 1).
    pub max_attempts: u32,
    /// Sleep between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

impl From<&ExtractConfig> for RetryPolicy {
    fn from(config: &ExtractConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff: Duration::from_millis(config.backoff_ms),
        }
    }
}

/// Fetch a topic's summary, retrying per `policy` before giving up.
///
/// Each failed attempt is logged; the final attempt's error propagates
/// unchanged to the caller.
pub async fn fetch_with_retry(
    client: &SummaryClient,
    topic: &str,
    policy: &RetryPolicy,
) -> Result<RawPage> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match client.fetch_summary(topic).await {
            Ok(page) => return Ok(page),
            Err(e) if attempt < max_attempts => {
                warn!(topic, attempt, max_attempts, error = %e, "extraction attempt failed, retrying");
                if !policy.backoff.is_zero() {
                    tokio::time::sleep(policy.backoff).await;
                }
            }
            Err(e) => {
                warn!(topic, attempt, error = %e, "extraction failed, giving up");
                return Err(e);
            }
        }
    }
}
