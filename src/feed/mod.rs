mod builder;
mod classify;
mod fetcher;
mod planner;
mod service;

pub use builder::{build_feed, ClassifiedTransaction};
pub use classify::{classify, decode_transfer, DecodedTransfer, TxKind, TRANSFER_TOPIC0};
pub use fetcher::{fetch_transfers, FetchOutcome, FetchStrategy};
pub use planner::{plan_ranges, BlockRange};
pub use service::{FeedService, FeedSnapshot, FeedState};
