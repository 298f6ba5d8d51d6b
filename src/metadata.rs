//! Token metadata lookup.
//!
//! The launchpad records a small amount of off-chain metadata per token,
//! keyed by its contract address. The feed only cares about the deployment
//! block (the lower bound for history scans); absence of a recorded
//! deployment block means the scan starts at genesis.

use std::collections::HashMap;

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
#[error("metadata store error: {0}")]
pub struct MetadataError(pub String);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Block at which the token contract was created. `None` falls back to
    /// a full-history scan from block 0, which is slow but correct.
    pub deployment_block: Option<u64>,
    pub symbol: Option<String>,
}

#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Look up the metadata recorded for a token address, if any.
    async fn token_metadata(&self, token: Address) -> Result<Option<TokenMetadata>, MetadataError>;
}

/// Process-local metadata store with upsert semantics. The production app
/// backs this interface with an external key-value store; this keeps the
/// same contract without the network hop.
#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    entries: RwLock<HashMap<Address, TokenMetadata>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the metadata for a token.
    pub async fn upsert(&self, token: Address, metadata: TokenMetadata) {
        self.entries.write().await.insert(token, metadata);
    }

    pub async fn remove(&self, token: Address) -> Option<TokenMetadata> {
        self.entries.write().await.remove(&token)
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn token_metadata(&self, token: Address) -> Result<Option<TokenMetadata>, MetadataError> {
        Ok(self.entries.read().await.get(&token).cloned())
    }
}
