//! Feed service: ties planning, fetching and building together behind a
//! view-lifecycle state machine.
//!
//! Each rebuild gets a monotonically increasing generation id. Only the
//! newest generation's completion is committed to the observable state, so
//! a build still in flight when the target token changes can never clobber
//! the newer feed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::RwLock;

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::feed::builder::{build_feed, ClassifiedTransaction};
use crate::feed::fetcher::fetch_transfers;
use crate::feed::planner::plan_ranges;
use crate::metadata::MetadataStore;
use crate::rpc::ChainReader;

/// A finished feed for one token.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub token: Address,
    pub pool: Address,
    pub token_symbol: Option<String>,
    pub transactions: Vec<ClassifiedTransaction>,
    /// True when at least one sub-range query failed, i.e. an empty
    /// `transactions` means "could not confirm" rather than "confirmed
    /// empty".
    pub incomplete: bool,
}

/// Observable lifecycle of the current feed.
#[derive(Debug, Clone, Default)]
pub enum FeedState {
    #[default]
    Idle,
    Loading {
        token: Address,
    },
    Loaded(FeedSnapshot),
    Failed {
        token: Address,
        message: String,
    },
}

pub struct FeedService<R, M> {
    reader: Arc<R>,
    metadata: Arc<M>,
    config: FeedConfig,
    generation: AtomicU64,
    // (generation, state): a commit is accepted only if its generation is
    // at least the recorded one.
    state: RwLock<(u64, FeedState)>,
}

impl<R: ChainReader, M: MetadataStore> FeedService<R, M> {
    pub fn new(reader: Arc<R>, metadata: Arc<M>, config: FeedConfig) -> Self {
        Self {
            reader,
            metadata,
            config,
            generation: AtomicU64::new(0),
            state: RwLock::new((0, FeedState::Idle)),
        }
    }

    /// Current observable state, as the UI layer would render it.
    pub async fn state(&self) -> FeedState {
        self.state.read().await.1.clone()
    }

    /// Rebuild the feed for a token and its presale pool.
    ///
    /// The returned snapshot always reflects this call's own build. The
    /// shared [`state`](Self::state) is only updated if no newer rebuild
    /// started in the meantime; a superseded build's result is discarded
    /// there rather than committed.
    pub async fn get_transaction_feed(
        &self,
        token: Address,
        pool: Address,
    ) -> Result<FeedSnapshot, FeedError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.commit(generation, FeedState::Loading { token }).await;

        let result = self.build(token, pool).await;
        match &result {
            Ok(snapshot) => {
                self.commit(generation, FeedState::Loaded(snapshot.clone()))
                    .await;
            }
            Err(err) => {
                self.commit(
                    generation,
                    FeedState::Failed {
                        token,
                        message: err.to_string(),
                    },
                )
                .await;
            }
        }
        result
    }

    async fn commit(&self, generation: u64, state: FeedState) {
        let mut guard = self.state.write().await;
        if generation >= guard.0 {
            *guard = (generation, state);
        } else {
            tracing::debug!(
                "discarding stale feed state from generation {} (current {})",
                generation,
                guard.0
            );
        }
    }

    async fn build(&self, token: Address, pool: Address) -> Result<FeedSnapshot, FeedError> {
        let metadata = self
            .metadata
            .token_metadata(token)
            .await
            .map_err(|err| FeedError::MetadataUnavailable {
                address: token.to_string(),
                message: err.to_string(),
            })?;

        let token_symbol = metadata.as_ref().and_then(|m| m.symbol.clone());
        let deployment_block = match metadata.and_then(|m| m.deployment_block) {
            Some(block) => block,
            None => {
                tracing::info!(
                    "no deployment block recorded for {}, scanning from genesis",
                    token
                );
                0
            }
        };

        let head = self
            .reader
            .latest_block_number()
            .await
            .map_err(FeedError::HeadUnavailable)?;

        // A deployment block past the head means stale metadata; clamp so
        // the scan still covers the head block.
        let start = deployment_block.min(head);
        let plan = plan_ranges(start, head, self.config.max_block_range());
        tracing::info!(
            "scanning {} sub-range(s) for {} (blocks {}-{})",
            plan.len(),
            token,
            start,
            head
        );

        let outcome = fetch_transfers(self.reader.as_ref(), token, &plan, &self.config).await;
        let transactions =
            build_feed(self.reader.as_ref(), &outcome.entries, pool, &self.config).await;

        tracing::info!(
            "feed for {}: {} transaction(s), incomplete: {}",
            token,
            transactions.len(),
            outcome.failed_ranges > 0
        );

        Ok(FeedSnapshot {
            token,
            pool,
            token_symbol,
            transactions,
            incomplete: outcome.failed_ranges > 0,
        })
    }
}
