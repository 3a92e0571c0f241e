//! Locally mined child-chain block descriptor.

use alloy_primitives::B256;

use crate::transaction::Transaction;

/// A child block as announced on the mined-block notification channel.
///
/// Carries the root triple committed to the root chain and the transaction
/// list the store indexes by position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildBlock {
    pub number: u64,
    pub hash: B256,
    pub is_request: bool,
    pub state_root: B256,
    pub transactions_root: B256,
    pub receipts_root: B256,
    pub transactions: Vec<Transaction>,
}
