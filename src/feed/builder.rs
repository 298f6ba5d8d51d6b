//! Feed building: timestamp resolution, deduplication, ordering.

use std::collections::{BTreeSet, HashMap, HashSet};

use alloy::primitives::{Address, B256, U256};
use alloy::rpc::types::Log;
use serde::Serialize;

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::feed::classify::{classify, decode_transfer, TxKind};
use crate::rpc::ChainReader;

/// One entry of the finished feed. Constructed once during a build and
/// immutable afterward.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedTransaction {
    pub kind: TxKind,
    /// Token base units, the literal on-chain transferred quantity.
    pub amount: U256,
    /// Unix seconds of the owning block.
    pub timestamp: u64,
    pub transaction_hash: B256,
    /// The party the event is attributed to (receiver for mint/buy, sender
    /// for burn/sell).
    pub actor: Address,
    pub from: Address,
    pub to: Address,
    pub block_number: u64,
}

/// Turn raw Transfer logs into the finished feed: decode, resolve each
/// owning block's timestamp, classify against the pool address, then dedup
/// by transaction hash (first occurrence wins), sort newest-first with
/// block number as tie-break, and truncate to the advertised feed length.
///
/// Never fails past this function: malformed logs and entries whose block
/// cannot be resolved are dropped individually. An all-drop build yields an
/// empty feed, indistinguishable here from a token with no transfers; the
/// caller tracks fetch failures separately to tell the two apart.
pub async fn build_feed<R: ChainReader + ?Sized>(
    reader: &R,
    entries: &[Log],
    pool: Address,
    config: &FeedConfig,
) -> Vec<ClassifiedTransaction> {
    let transfers: Vec<_> = entries
        .iter()
        .filter_map(|log| {
            let decoded = decode_transfer(log);
            if decoded.is_none() {
                tracing::debug!("dropping malformed transfer log in tx {:?}", log.transaction_hash);
            }
            decoded
        })
        .collect();

    let timestamps = resolve_timestamps(
        reader,
        transfers.iter().map(|t| t.block_number).collect(),
        config.block_fetch_concurrency(),
    )
    .await;

    let mut seen_hashes: HashSet<B256> = HashSet::new();
    let mut feed: Vec<ClassifiedTransaction> = Vec::with_capacity(transfers.len());

    for transfer in transfers {
        let Some(&timestamp) = timestamps.get(&transfer.block_number) else {
            tracing::debug!(
                "dropping transfer in tx {} (block {} unresolved)",
                transfer.transaction_hash,
                transfer.block_number
            );
            continue;
        };
        if !seen_hashes.insert(transfer.transaction_hash) {
            continue;
        }

        let (kind, actor) = classify(&transfer, pool);
        feed.push(ClassifiedTransaction {
            kind,
            amount: transfer.value,
            timestamp,
            transaction_hash: transfer.transaction_hash,
            actor,
            from: transfer.from,
            to: transfer.to,
            block_number: transfer.block_number,
        });
    }

    feed.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then(b.block_number.cmp(&a.block_number))
    });
    feed.truncate(config.feed_limit());
    feed
}

/// Resolve Unix timestamps for a set of block numbers, at most one read per
/// distinct block, with reads issued in bounded concurrent chunks. Blocks
/// that fail to resolve are simply absent from the returned map.
async fn resolve_timestamps<R: ChainReader + ?Sized>(
    reader: &R,
    blocks: BTreeSet<u64>,
    concurrency: usize,
) -> HashMap<u64, u64> {
    let mut timestamps = HashMap::with_capacity(blocks.len());
    let blocks: Vec<u64> = blocks.into_iter().collect();

    for chunk in blocks.chunks(concurrency) {
        let futures: Vec<_> = chunk
            .iter()
            .map(|&number| async move { (number, reader.get_block_timestamp(number).await) })
            .collect();

        for (number, result) in futures::future::join_all(futures).await {
            match result {
                Ok(timestamp) => {
                    timestamps.insert(number, timestamp);
                }
                Err(err) => {
                    let err = FeedError::BlockResolution {
                        block: number,
                        message: err.to_string(),
                    };
                    tracing::debug!("{}", err);
                }
            }
        }
    }

    timestamps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::testing::{addr, hash, transfer_log, MockChainReader};
    use std::sync::atomic::Ordering;

    fn reader_with_timestamps(pairs: &[(u64, u64)]) -> MockChainReader {
        MockChainReader {
            timestamps: pairs.iter().copied().collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn duplicate_hashes_collapse_to_first_occurrence() {
        let reader = reader_with_timestamps(&[(10, 1000), (20, 2000)]);
        let logs = vec![
            transfer_log(addr(0x01), addr(0x02), 5, 10, hash(0x01)),
            transfer_log(addr(0x03), addr(0x04), 7, 20, hash(0x01)),
        ];

        let feed = build_feed(&reader, &logs, addr(0x99), &FeedConfig::default()).await;
        assert_eq!(feed.len(), 1);
        // First occurrence wins.
        assert_eq!(feed[0].from, addr(0x01));
        assert_eq!(feed[0].amount, U256::from(5));
    }

    #[tokio::test]
    async fn feed_is_sorted_newest_first_with_block_tiebreak() {
        let reader = reader_with_timestamps(&[(10, 5000), (11, 5000), (12, 1000)]);
        let logs = vec![
            transfer_log(addr(0x01), addr(0x02), 1, 12, hash(0x01)),
            transfer_log(addr(0x01), addr(0x02), 2, 10, hash(0x02)),
            transfer_log(addr(0x01), addr(0x02), 3, 11, hash(0x03)),
        ];

        let feed = build_feed(&reader, &logs, addr(0x99), &FeedConfig::default()).await;
        let order: Vec<(u64, u64)> = feed.iter().map(|t| (t.timestamp, t.block_number)).collect();
        assert_eq!(order, vec![(5000, 11), (5000, 10), (1000, 12)]);
        for pair in feed.windows(2) {
            assert!(
                (pair[0].timestamp, pair[0].block_number)
                    >= (pair[1].timestamp, pair[1].block_number)
            );
        }
    }

    #[tokio::test]
    async fn truncates_to_feed_limit_keeping_most_recent() {
        let pairs: Vec<(u64, u64)> = (1..=8).map(|b| (b, b * 100)).collect();
        let reader = reader_with_timestamps(&pairs);
        let logs: Vec<_> = (1..=8)
            .map(|b| transfer_log(addr(0x01), addr(0x02), b, b, hash(b as u8)))
            .collect();

        let config = FeedConfig {
            feed_limit: Some(5),
            ..Default::default()
        };
        let feed = build_feed(&reader, &logs, addr(0x99), &config).await;
        assert_eq!(feed.len(), 5);
        // The three oldest fell off.
        let blocks: Vec<u64> = feed.iter().map(|t| t.block_number).collect();
        assert_eq!(blocks, vec![8, 7, 6, 5, 4]);
    }

    #[tokio::test]
    async fn repeat_block_numbers_cost_one_read_each() {
        let reader = reader_with_timestamps(&[(10, 1000), (20, 2000)]);
        let logs = vec![
            transfer_log(addr(0x01), addr(0x02), 1, 10, hash(0x01)),
            transfer_log(addr(0x01), addr(0x02), 2, 10, hash(0x02)),
            transfer_log(addr(0x01), addr(0x02), 3, 10, hash(0x03)),
            transfer_log(addr(0x01), addr(0x02), 4, 20, hash(0x04)),
        ];

        let feed = build_feed(&reader, &logs, addr(0x99), &FeedConfig::default()).await;
        assert_eq!(feed.len(), 4);
        // Two distinct blocks, exactly two reads.
        assert_eq!(reader.block_reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unresolvable_block_drops_only_its_entries() {
        crate::feed::testing::init_tracing();
        let reader = MockChainReader {
            timestamps: [(10, 1000), (20, 2000)].into_iter().collect(),
            fail_blocks: [20].into_iter().collect(),
            ..Default::default()
        };
        let logs = vec![
            transfer_log(addr(0x01), addr(0x02), 1, 10, hash(0x01)),
            transfer_log(addr(0x01), addr(0x02), 2, 20, hash(0x02)),
        ];

        let feed = build_feed(&reader, &logs, addr(0x99), &FeedConfig::default()).await;
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].block_number, 10);
    }

    #[tokio::test]
    async fn all_entries_dropping_yields_empty_feed() {
        let reader = MockChainReader {
            fail_blocks: [10].into_iter().collect(),
            ..Default::default()
        };
        let logs = vec![transfer_log(addr(0x01), addr(0x02), 1, 10, hash(0x01))];

        let feed = build_feed(&reader, &logs, addr(0x99), &FeedConfig::default()).await;
        assert!(feed.is_empty());
    }

    #[tokio::test]
    async fn classification_flows_through_to_the_feed() {
        let pool = addr(0x99);
        let reader = reader_with_timestamps(&[(10, 1000)]);
        let logs = vec![transfer_log(pool, addr(0x02), 42, 10, hash(0x01))];

        let feed = build_feed(&reader, &logs, pool, &FeedConfig::default()).await;
        assert_eq!(feed[0].kind, TxKind::Buy);
        assert_eq!(feed[0].actor, addr(0x02));
        assert_eq!(feed[0].amount, U256::from(42));
        assert_eq!(feed[0].timestamp, 1000);
    }
}
