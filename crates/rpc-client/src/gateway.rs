//! The gateway surface the node core consumes.

use alloy_primitives::{Address, Bytes, B256};
use anyhow::Result;
use async_trait::async_trait;
use plasma_types::epoch::{BlockRecord, Epoch};
use plasma_types::event::{BlockFinalized, BlockSubmitted, EpochPrepared};
use plasma_types::request::{Ero, RequestBlock};

use crate::rpc_types::{SyncProgress, TransactionReceipt};

/// A live event subscription: decoded events on one channel, the fatal
/// subscription error (if any) on the other. Once an error is delivered the
/// event channel is closed.
pub struct Subscription<T> {
    pub events: async_channel::Receiver<T>,
    pub errors: async_channel::Receiver<anyhow::Error>,
}

#[async_trait]
pub trait RootChainGateway: Send + Sync {
    async fn iterate_epoch_prepared(&self, from_block: u64) -> Result<Vec<EpochPrepared>>;
    async fn iterate_block_finalized(&self, from_block: u64) -> Result<Vec<BlockFinalized>>;

    fn watch_epoch_prepared(&self, from_block: u64) -> Subscription<EpochPrepared>;
    fn watch_block_finalized(&self, from_block: u64) -> Subscription<BlockFinalized>;
    fn watch_block_submitted(&self) -> Subscription<BlockSubmitted>;

    async fn epoch(&self, fork: u64, epoch_number: u64) -> Result<Epoch>;
    async fn block(&self, fork: u64, block_number: u64) -> Result<BlockRecord>;
    async fn last_block(&self, fork: u64) -> Result<u64>;
    async fn orbs(&self, request_block_id: u64) -> Result<RequestBlock>;
    async fn eros(&self, request_id: u64) -> Result<Ero>;
    async fn requestable_contracts(&self, rootchain: Address) -> Result<Address>;
    async fn ero_bytes(&self, request_id: u64) -> Result<Bytes>;
    async fn current_fork(&self) -> Result<u64>;
    async fn nre_length(&self) -> Result<u64>;

    async fn send_transaction(&self, raw: Bytes) -> Result<B256>;
    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TransactionReceipt>>;
    async fn sync_progress(&self) -> Result<Option<SyncProgress>>;
}
