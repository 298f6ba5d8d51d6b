//! Feed error taxonomy.

use thiserror::Error;

use crate::rpc::RpcError;

/// Failures surfaced by feed reconstruction.
///
/// Only `HeadUnavailable` and `MetadataUnavailable` abort a build. The
/// per-sub-range and per-entry variants degrade: a failed sub-range is
/// skipped by the fetcher and a transaction whose block cannot be resolved
/// is dropped by the builder, in both cases with the feed marked incomplete
/// rather than failed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to read chain head: {0}")]
    HeadUnavailable(#[source] RpcError),

    #[error("metadata lookup failed for {address}: {message}")]
    MetadataUnavailable { address: String, message: String },

    #[error("log query failed for blocks {from}-{to}: {message}")]
    RangeQuery {
        from: u64,
        to: u64,
        message: String,
    },

    #[error("could not resolve block {block}: {message}")]
    BlockResolution { block: u64, message: String },
}
