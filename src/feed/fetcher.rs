//! Log fetching.
//!
//! One log query per planned sub-range, executed sequentially to stay under
//! node rate limits. A failed or timed-out sub-range is logged and skipped;
//! the feed degrades to partial results instead of failing outright.

use alloy::primitives::Address;
use alloy::rpc::types::Log;

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::feed::classify::TRANSFER_TOPIC0;
use crate::feed::planner::BlockRange;
use crate::rpc::ChainReader;

/// How Transfer logs are queried from the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Ask the node to filter by the Transfer signature topic server-side.
    TypedFilter,
    /// Ask for every log the contract emitted in range and match the
    /// signature topic locally. Some nodes under-report for topic-filtered
    /// queries; this strategy trades bandwidth for completeness.
    RawScan,
}

/// Result of fetching across a whole plan. `failed_ranges` lets callers
/// distinguish a confirmed-empty feed from one that could not be confirmed.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub entries: Vec<Log>,
    pub failed_ranges: usize,
}

/// Fetch the token's Transfer logs across every planned sub-range.
///
/// The typed strategy runs first over the entire plan. If it yields no more
/// than `fallback_threshold` entries in total, the raw-scan strategy runs
/// over the entire plan as well, and its results replace the typed ones
/// only when strictly more numerous. Successful sub-range results are
/// concatenated in plan order; ordering within a sub-range is whatever the
/// node returned.
pub async fn fetch_transfers<R: ChainReader + ?Sized>(
    reader: &R,
    token: Address,
    plan: &[BlockRange],
    config: &FeedConfig,
) -> FetchOutcome {
    let typed = run_strategy(reader, token, plan, FetchStrategy::TypedFilter, config).await;
    tracing::info!(
        "typed filter found {} transfer(s) for {} ({} of {} sub-ranges failed)",
        typed.entries.len(),
        token,
        typed.failed_ranges,
        plan.len()
    );

    if typed.entries.len() > config.fallback_threshold() {
        return typed;
    }

    // A token with real activity should have more than a lone transfer; a
    // near-empty typed result usually means the node under-matched.
    let raw = run_strategy(reader, token, plan, FetchStrategy::RawScan, config).await;
    tracing::info!(
        "raw scan found {} transfer(s) for {} ({} of {} sub-ranges failed)",
        raw.entries.len(),
        token,
        raw.failed_ranges,
        plan.len()
    );

    if raw.entries.len() > typed.entries.len() {
        raw
    } else {
        typed
    }
}

async fn run_strategy<R: ChainReader + ?Sized>(
    reader: &R,
    token: Address,
    plan: &[BlockRange],
    strategy: FetchStrategy,
    config: &FeedConfig,
) -> FetchOutcome {
    let mut outcome = FetchOutcome::default();

    for range in plan {
        match fetch_range(reader, token, *range, strategy, config).await {
            Ok(mut entries) => {
                tracing::debug!(
                    "blocks {}: {} matching log(s) via {:?}",
                    range,
                    entries.len(),
                    strategy
                );
                outcome.entries.append(&mut entries);
            }
            Err(err) => {
                tracing::warn!("skipping sub-range: {}", err);
                outcome.failed_ranges += 1;
            }
        }
    }

    outcome
}

async fn fetch_range<R: ChainReader + ?Sized>(
    reader: &R,
    token: Address,
    range: BlockRange,
    strategy: FetchStrategy,
    config: &FeedConfig,
) -> Result<Vec<Log>, FeedError> {
    let topic0 = match strategy {
        FetchStrategy::TypedFilter => Some(TRANSFER_TOPIC0),
        FetchStrategy::RawScan => None,
    };

    let query = reader.get_logs(token, topic0, range);
    let logs = match tokio::time::timeout(config.call_timeout(), query).await {
        Ok(Ok(logs)) => logs,
        Ok(Err(err)) => {
            return Err(FeedError::RangeQuery {
                from: range.from,
                to: range.to,
                message: err.to_string(),
            })
        }
        Err(_) => {
            return Err(FeedError::RangeQuery {
                from: range.from,
                to: range.to,
                message: format!("timed out after {:?}", config.call_timeout()),
            })
        }
    };

    Ok(match strategy {
        FetchStrategy::TypedFilter => logs,
        FetchStrategy::RawScan => logs
            .into_iter()
            .filter(|log| log.inner.data.topics().first() == Some(&TRANSFER_TOPIC0))
            .collect(),
    })
}
