//! Transfer-event reconstruction for presale tokens.
//!
//! Given a token contract and the pool contract that ran its presale, this
//! crate scans the token's Transfer history through a range-limited RPC read
//! API, classifies each transfer into an economic event (mint, burn, buy,
//! sell) and produces a deduplicated, newest-first transaction feed.
//!
//! The pipeline has three stages:
//! - [`feed::plan_ranges`] partitions `[deployment block, chain head]` into
//!   sub-ranges no wider than the node's per-query ceiling,
//! - [`feed::fetch_transfers`] runs one log query per sub-range, with a
//!   raw-scan fallback when the typed filter under-matches, skipping failed
//!   sub-ranges instead of aborting,
//! - [`feed::build_feed`] resolves block timestamps, classifies, dedups,
//!   sorts and truncates.
//!
//! [`feed::FeedService`] ties the stages together behind a generation-guarded
//! state machine so a rebuild for a new token can never be overwritten by a
//! stale in-flight build.

pub mod config;
pub mod error;
pub mod feed;
pub mod metadata;
pub mod rpc;

pub use config::FeedConfig;
pub use error::FeedError;
pub use feed::{
    build_feed, classify, fetch_transfers, plan_ranges, BlockRange, ClassifiedTransaction,
    DecodedTransfer, FeedService, FeedSnapshot, FeedState, FetchOutcome, TxKind, TRANSFER_TOPIC0,
};
pub use metadata::{InMemoryMetadataStore, MetadataError, MetadataStore, TokenMetadata};
pub use rpc::{ChainReader, RetryConfig, RpcClient, RpcClientConfig, RpcError};
