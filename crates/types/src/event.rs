//! Decoded root chain contract events.
//!
//! Every event carries `raw_block_number`, the root-chain block the log was
//! emitted in. The event loop persists it as the resume cursor after a
//! successful handling.

/// A new epoch was prepared on the root chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpochPrepared {
    pub epoch_number: u64,
    pub fork_number: u64,
    pub start_block: u64,
    pub end_block: u64,
    pub is_request: bool,
    pub user_activated: bool,
    pub is_empty: bool,
    pub rebase: bool,
    pub raw_block_number: u64,
}

impl EpochPrepared {
    /// Number of child blocks (and, for request epochs, ORBs) announced.
    pub fn block_count(&self) -> u64 {
        self.end_block - self.start_block + 1
    }
}

/// A committed child block was finalized on the root chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockFinalized {
    pub fork_number: u64,
    pub block_number: u64,
    pub raw_block_number: u64,
}

/// A child block submission was accepted by the root chain contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockSubmitted {
    pub fork_number: u64,
    pub block_number: u64,
    pub raw_block_number: u64,
}
