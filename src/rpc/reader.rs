use alloy::primitives::{Address, B256};
use alloy::rpc::types::{Filter, Log};
use async_trait::async_trait;

use crate::feed::BlockRange;
use crate::rpc::rpc::{RpcClient, RpcError};

/// The three chain reads feed reconstruction depends on. `RpcClient`
/// implements this over HTTP JSON-RPC; tests substitute an in-memory
/// implementation.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Current chain head.
    async fn latest_block_number(&self) -> Result<u64, RpcError>;

    /// Logs emitted by `address` within the inclusive `range`. With
    /// `topic0` set the node filters by event signature server-side;
    /// without it, all of the contract's logs in range come back and the
    /// caller matches signatures itself.
    async fn get_logs(
        &self,
        address: Address,
        topic0: Option<B256>,
        range: BlockRange,
    ) -> Result<Vec<Log>, RpcError>;

    /// Unix timestamp of the given block.
    async fn get_block_timestamp(&self, number: u64) -> Result<u64, RpcError>;
}

#[async_trait]
impl ChainReader for RpcClient {
    async fn latest_block_number(&self) -> Result<u64, RpcError> {
        self.get_block_number().await
    }

    async fn get_logs(
        &self,
        address: Address,
        topic0: Option<B256>,
        range: BlockRange,
    ) -> Result<Vec<Log>, RpcError> {
        let mut filter = Filter::new()
            .address(address)
            .from_block(range.from)
            .to_block(range.to);
        if let Some(topic0) = topic0 {
            filter = filter.event_signature(topic0);
        }
        RpcClient::get_logs(self, &filter).await
    }

    async fn get_block_timestamp(&self, number: u64) -> Result<u64, RpcError> {
        RpcClient::get_block_timestamp(self, number).await
    }
}
