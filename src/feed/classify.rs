//! Transfer decoding and economic classification.

use alloy::primitives::{b256, Address, B256, U256};
use alloy::rpc::types::Log;
use serde::Serialize;

/// keccak256 of `Transfer(address,address,uint256)`.
pub const TRANSFER_TOPIC0: B256 =
    b256!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef");

/// A Transfer log after interpretation. Addresses are raw 20-byte values,
/// so identity comparisons are unaffected by the mixed-case hex forms nodes
/// and wallets emit.
#[derive(Debug, Clone)]
pub struct DecodedTransfer {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub block_number: u64,
    pub transaction_hash: B256,
}

/// Economic category of a transfer, from the presale's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Mint,
    Burn,
    Buy,
    Sell,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Mint => "mint",
            TxKind::Burn => "burn",
            TxKind::Buy => "buy",
            TxKind::Sell => "sell",
        }
    }
}

impl std::fmt::Display for TxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interpret a raw log as an ERC-20 Transfer. Returns `None` for logs that
/// are not fully-formed transfers: wrong or missing signature topic, missing
/// indexed parties, a data payload too short to hold the amount, or a
/// pending log with no block number / transaction hash yet.
pub fn decode_transfer(log: &Log) -> Option<DecodedTransfer> {
    let topics = log.inner.data.topics();
    if topics.len() < 3 || topics[0] != TRANSFER_TOPIC0 {
        return None;
    }

    let data = log.inner.data.data.as_ref();
    if data.len() < 32 {
        return None;
    }

    Some(DecodedTransfer {
        from: Address::from_word(topics[1]),
        to: Address::from_word(topics[2]),
        value: U256::from_be_slice(&data[..32]),
        block_number: log.block_number?,
        transaction_hash: log.transaction_hash?,
    })
}

/// Assign an economic category and acting party to a transfer, evaluated in
/// precedence order against the zero address and the presale pool:
///
/// 1. from zero address: mint, actor is the receiver
/// 2. to zero address: burn, actor is the sender
/// 3. from pool: buy (presale participation), actor is the receiver
/// 4. to pool: sell (refund/withdrawal), actor is the sender
/// 5. anything else: buy, actor is the receiver
///
/// Case 5 is an acknowledged approximation for peer-to-peer transfers, kept
/// because downstream consumers rely on the four-way labeling.
pub fn classify(transfer: &DecodedTransfer, pool: Address) -> (TxKind, Address) {
    if transfer.from == Address::ZERO {
        (TxKind::Mint, transfer.to)
    } else if transfer.to == Address::ZERO {
        (TxKind::Burn, transfer.from)
    } else if transfer.from == pool {
        (TxKind::Buy, transfer.to)
    } else if transfer.to == pool {
        (TxKind::Sell, transfer.from)
    } else {
        (TxKind::Buy, transfer.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::testing::{addr, hash, transfer_log};
    use alloy::primitives::{Bytes, LogData};

    fn decoded(from: Address, to: Address, value: u64) -> DecodedTransfer {
        DecodedTransfer {
            from,
            to,
            value: U256::from(value),
            block_number: 1,
            transaction_hash: hash(0x01),
        }
    }

    #[test]
    fn transfer_topic_matches_known_signature() {
        let expected =
            hex::decode("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef")
                .unwrap();
        assert_eq!(TRANSFER_TOPIC0.as_slice(), expected.as_slice());
    }

    #[test]
    fn from_zero_address_is_mint() {
        let transfer = decoded(Address::ZERO, addr(0xab), 100);
        let (kind, actor) = classify(&transfer, addr(0x99));
        assert_eq!(kind, TxKind::Mint);
        assert_eq!(actor, addr(0xab));
        assert_eq!(transfer.value, U256::from(100));
    }

    #[test]
    fn to_zero_address_is_burn() {
        let transfer = decoded(addr(0xab), Address::ZERO, 50);
        let (kind, actor) = classify(&transfer, addr(0x99));
        assert_eq!(kind, TxKind::Burn);
        assert_eq!(actor, addr(0xab));
    }

    #[test]
    fn from_pool_is_buy() {
        let pool = addr(0x99);
        let transfer = decoded(pool, addr(0x01), 10);
        let (kind, actor) = classify(&transfer, pool);
        assert_eq!(kind, TxKind::Buy);
        assert_eq!(actor, addr(0x01));
    }

    #[test]
    fn to_pool_is_sell() {
        let pool = addr(0x99);
        let transfer = decoded(addr(0x01), pool, 10);
        let (kind, actor) = classify(&transfer, pool);
        assert_eq!(kind, TxKind::Sell);
        assert_eq!(actor, addr(0x01));
    }

    #[test]
    fn peer_to_peer_defaults_to_buy() {
        let transfer = decoded(addr(0x01), addr(0x02), 5);
        let (kind, actor) = classify(&transfer, addr(0x99));
        assert_eq!(kind, TxKind::Buy);
        assert_eq!(actor, addr(0x02));
    }

    #[test]
    fn mint_wins_over_pool_match() {
        // A pool minting to itself is still a mint: precedence rule 1.
        let pool = addr(0x99);
        let transfer = decoded(Address::ZERO, pool, 7);
        let (kind, _) = classify(&transfer, pool);
        assert_eq!(kind, TxKind::Mint);
    }

    #[test]
    fn decode_roundtrips_a_well_formed_log() {
        let log = transfer_log(addr(0x01), addr(0x02), 1234, 77, hash(0x0a));
        let transfer = decode_transfer(&log).unwrap();
        assert_eq!(transfer.from, addr(0x01));
        assert_eq!(transfer.to, addr(0x02));
        assert_eq!(transfer.value, U256::from(1234));
        assert_eq!(transfer.block_number, 77);
        assert_eq!(transfer.transaction_hash, hash(0x0a));
    }

    #[test]
    fn decode_rejects_foreign_event() {
        let mut log = transfer_log(addr(0x01), addr(0x02), 1, 1, hash(0x01));
        log.inner.data = LogData::new_unchecked(
            vec![hash(0xff), addr(0x01).into_word(), addr(0x02).into_word()],
            log.inner.data.data.clone(),
        );
        assert!(decode_transfer(&log).is_none());
    }

    #[test]
    fn decode_rejects_missing_indexed_parties() {
        let mut log = transfer_log(addr(0x01), addr(0x02), 1, 1, hash(0x01));
        log.inner.data =
            LogData::new_unchecked(vec![TRANSFER_TOPIC0], log.inner.data.data.clone());
        assert!(decode_transfer(&log).is_none());
    }

    #[test]
    fn decode_rejects_short_data_payload() {
        let mut log = transfer_log(addr(0x01), addr(0x02), 1, 1, hash(0x01));
        log.inner.data = LogData::new_unchecked(
            log.inner.data.topics().to_vec(),
            Bytes::from(vec![0x01, 0x02]),
        );
        assert!(decode_transfer(&log).is_none());
    }

    #[test]
    fn decode_rejects_pending_log() {
        let mut log = transfer_log(addr(0x01), addr(0x02), 1, 1, hash(0x01));
        log.block_number = None;
        assert!(decode_transfer(&log).is_none());
    }
}
