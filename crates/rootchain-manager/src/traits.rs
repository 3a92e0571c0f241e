//! Interfaces of the local collaborators the manager drives.

use std::sync::atomic::{AtomicBool, Ordering};

use alloy_primitives::Address;
use anyhow::Result;
use async_trait::async_trait;
use plasma_types::event::EpochPrepared;
use plasma_types::transaction::Transaction;

/// The transaction pool's request-batch entry point. An accepted batch is
/// mined together in the next request block.
#[async_trait]
pub trait TxPool: Send + Sync {
    async fn enqueue_request_txs(&self, txs: Vec<Transaction>) -> Result<()>;
}

/// Control surface of the child-chain block producer.
pub trait BlockProducer: Send + Sync {
    /// Start producing the announced epoch under the operator identity.
    /// Must not block; production proceeds in the background.
    fn start(&self, operator: Address, epoch: &EpochPrepared, rebase: bool);
    fn stop(&self);
    fn set_nrb_epoch_length(&self, length: u64);
}

/// Snapshot of the producer's active epoch, shared between the producer
/// and the manager tasks.
#[derive(Default)]
pub struct EpochEnvironment {
    is_request: AtomicBool,
    completed: AtomicBool,
}

impl EpochEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_request(&self) -> bool {
        self.is_request.load(Ordering::SeqCst)
    }

    pub fn set_is_request(&self, is_request: bool) {
        self.is_request.store(is_request, Ordering::SeqCst);
    }

    pub fn completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn set_completed(&self, completed: bool) {
        self.completed.store(completed, Ordering::SeqCst);
    }
}
