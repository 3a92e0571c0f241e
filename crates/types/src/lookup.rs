//! Positional lookup entries persisted by the store.

use alloy_primitives::B256;
use alloy_rlp::{RlpDecodable, RlpEncodable};

/// Positional metadata of a transaction, keyed by its hash. Resolving the
/// entry and indexing into the block body (or receipts) retrieves the
/// transaction (or receipt) without a full scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct TxLookupEntry {
    pub block_hash: B256,
    pub block_number: u64,
    pub index: u64,
}

/// Positions of the failed receipts detected in a mined request block,
/// keyed by `(fork, block number, block hash)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct InvalidExitReceiptsLookupEntry {
    pub block_hash: B256,
    pub block_number: u64,
    pub indices: Vec<u64>,
}
