use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Tunables for feed reconstruction. Every field is optional so a config
/// file only needs to name what it changes; unset fields fall back to the
/// defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedConfig {
    /// Widest block range a single log query may span. Default 2000, the
    /// ceiling enforced by most public RPC endpoints.
    pub max_block_range: Option<u64>,
    /// Number of transactions the finished feed advertises. Default 5.
    pub feed_limit: Option<usize>,
    /// If the typed-filter strategy returns this many entries or fewer, the
    /// raw-scan strategy runs as well. A lone event usually means the typed
    /// filter under-matched, but the threshold can misfire for genuinely
    /// quiet tokens, so it is tunable. Default 1.
    pub fallback_threshold: Option<usize>,
    /// Per-call timeout in seconds for log and block reads. An expired call
    /// counts as a failed sub-range. The timeout bounds the entire call,
    /// including any retries and backoff the reader performs internally, so
    /// a reader configured with a long retry envelope needs this raised to
    /// match or its retries never get a chance to run. Default 5.
    pub call_timeout_secs: Option<u64>,
    /// How many block-timestamp reads may run at once during classification.
    /// Default 8.
    pub block_fetch_concurrency: Option<usize>,
}

impl FeedConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file at {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("failed to parse config file at {}", path.display()))
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn max_block_range(&self) -> u64 {
        self.max_block_range.unwrap_or(2000).max(1)
    }

    pub fn feed_limit(&self) -> usize {
        self.feed_limit.unwrap_or(5)
    }

    pub fn fallback_threshold(&self) -> usize {
        self.fallback_threshold.unwrap_or(1)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs.unwrap_or(5))
    }

    pub fn block_fetch_concurrency(&self) -> usize {
        self.block_fetch_concurrency.unwrap_or(8).max(1)
    }
}
