//! Cross-chain request descriptors held by the root chain contract.

use alloy_primitives::{Address, B256, U256};

/// A request block (ORB) descriptor: the contiguous range of request ids
/// that must appear, in order, in the corresponding child block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestBlock {
    pub request_start: u64,
    pub request_end: u64,
    pub submitted: bool,
}

impl RequestBlock {
    pub fn request_count(&self) -> u64 {
        self.request_end - self.request_start + 1
    }
}

/// An externally-enqueued request object (ERO).
///
/// Transfers target the requestor directly; any other request targets the
/// child-chain counterpart of `to` and carries an apply-request call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ero {
    pub hash: B256,
    pub is_transfer: bool,
    pub is_exit: bool,
    pub requestor: Address,
    pub to: Address,
    pub value: U256,
    pub trie_key: B256,
    pub trie_value: B256,
}
