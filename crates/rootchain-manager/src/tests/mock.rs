//! Mock collaborators for the manager tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use alloy_primitives::{keccak256, Address, Bytes, B256, U64};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use plasma_rpc_client::gateway::{RootChainGateway, Subscription};
use plasma_rpc_client::rpc_types::{SyncProgress, TransactionReceipt};
use plasma_types::block::ChildBlock;
use plasma_types::epoch::{BlockRecord, Epoch};
use plasma_types::event::{BlockFinalized, BlockSubmitted, EpochPrepared};
use plasma_types::request::{Ero, RequestBlock};
use plasma_types::transaction::Transaction;

use crate::traits::{BlockProducer, TxPool};

pub struct MockGateway {
    pub epochs: Mutex<HashMap<(u64, u64), Epoch>>,
    pub block_records: Mutex<HashMap<(u64, u64), BlockRecord>>,
    pub orbs: Mutex<HashMap<u64, RequestBlock>>,
    pub eros: Mutex<HashMap<u64, Ero>>,
    pub ero_bytes: Mutex<HashMap<u64, Bytes>>,
    pub requestable: Mutex<HashMap<Address, Address>>,
    pub current_fork: AtomicU64,
    pub nre_length: AtomicU64,

    /// Raw transactions in dispatch order.
    pub sent: Mutex<Vec<Bytes>>,
    sent_tx: async_channel::Sender<B256>,
    pub sent_rx: async_channel::Receiver<B256>,

    block_submitted_tx: async_channel::Sender<BlockSubmitted>,
    block_submitted_rx: async_channel::Receiver<BlockSubmitted>,
    #[allow(dead_code)]
    submitted_error_tx: async_channel::Sender<anyhow::Error>,
    submitted_error_rx: async_channel::Receiver<anyhow::Error>,
}

impl Default for MockGateway {
    fn default() -> Self {
        let (sent_tx, sent_rx) = async_channel::unbounded();
        let (block_submitted_tx, block_submitted_rx) = async_channel::unbounded();
        let (submitted_error_tx, submitted_error_rx) = async_channel::unbounded();
        MockGateway {
            epochs: Default::default(),
            block_records: Default::default(),
            orbs: Default::default(),
            eros: Default::default(),
            ero_bytes: Default::default(),
            requestable: Default::default(),
            current_fork: AtomicU64::new(0),
            nre_length: AtomicU64::new(2),
            sent: Default::default(),
            sent_tx,
            sent_rx,
            block_submitted_tx,
            block_submitted_rx,
            submitted_error_tx,
            submitted_error_rx,
        }
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// The dispatched transactions, decoded from their raw form.
    pub fn sent_transactions(&self) -> Vec<Transaction> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|raw| {
                alloy_rlp_decode(raw).expect("decode sent transaction")
            })
            .collect()
    }

    /// Deliver a BlockSubmitted event to the watching submitter.
    pub async fn confirm_submission(&self, fork_number: u64, block_number: u64) {
        self.block_submitted_tx
            .send(BlockSubmitted {
                fork_number,
                block_number,
                raw_block_number: 0,
            })
            .await
            .expect("deliver block submitted");
    }

    fn empty_subscription<T>() -> Subscription<T> {
        let (_event_tx, events) = async_channel::bounded(1);
        let (_error_tx, errors) = async_channel::bounded(1);
        Subscription { events, errors }
    }
}

fn alloy_rlp_decode(raw: &Bytes) -> Result<Transaction> {
    use alloy_rlp::Decodable;
    Ok(Transaction::decode(&mut raw.as_ref())?)
}

#[async_trait]
impl RootChainGateway for MockGateway {
    async fn iterate_epoch_prepared(&self, _from_block: u64) -> Result<Vec<EpochPrepared>> {
        Ok(Vec::new())
    }

    async fn iterate_block_finalized(&self, _from_block: u64) -> Result<Vec<BlockFinalized>> {
        Ok(Vec::new())
    }

    fn watch_epoch_prepared(&self, _from_block: u64) -> Subscription<EpochPrepared> {
        Self::empty_subscription()
    }

    fn watch_block_finalized(&self, _from_block: u64) -> Subscription<BlockFinalized> {
        Self::empty_subscription()
    }

    fn watch_block_submitted(&self) -> Subscription<BlockSubmitted> {
        Subscription {
            events: self.block_submitted_rx.clone(),
            errors: self.submitted_error_rx.clone(),
        }
    }

    async fn epoch(&self, fork: u64, epoch_number: u64) -> Result<Epoch> {
        self.epochs
            .lock()
            .unwrap()
            .get(&(fork, epoch_number))
            .cloned()
            .ok_or_else(|| anyhow!("no epoch {} in fork {}", epoch_number, fork))
    }

    async fn block(&self, fork: u64, block_number: u64) -> Result<BlockRecord> {
        self.block_records
            .lock()
            .unwrap()
            .get(&(fork, block_number))
            .cloned()
            .ok_or_else(|| anyhow!("no block {} in fork {}", block_number, fork))
    }

    async fn last_block(&self, _fork: u64) -> Result<u64> {
        Ok(0)
    }

    async fn orbs(&self, request_block_id: u64) -> Result<RequestBlock> {
        self.orbs
            .lock()
            .unwrap()
            .get(&request_block_id)
            .cloned()
            .ok_or_else(|| anyhow!("no request block {}", request_block_id))
    }

    async fn eros(&self, request_id: u64) -> Result<Ero> {
        self.eros
            .lock()
            .unwrap()
            .get(&request_id)
            .cloned()
            .ok_or_else(|| anyhow!("no request {}", request_id))
    }

    async fn requestable_contracts(&self, rootchain: Address) -> Result<Address> {
        Ok(self
            .requestable
            .lock()
            .unwrap()
            .get(&rootchain)
            .copied()
            .unwrap_or(Address::ZERO))
    }

    async fn ero_bytes(&self, request_id: u64) -> Result<Bytes> {
        self.ero_bytes
            .lock()
            .unwrap()
            .get(&request_id)
            .cloned()
            .ok_or_else(|| anyhow!("no request bytes {}", request_id))
    }

    async fn current_fork(&self) -> Result<u64> {
        Ok(self.current_fork.load(Ordering::SeqCst))
    }

    async fn nre_length(&self) -> Result<u64> {
        Ok(self.nre_length.load(Ordering::SeqCst))
    }

    async fn send_transaction(&self, raw: Bytes) -> Result<B256> {
        let hash = keccak256(&raw);
        self.sent.lock().unwrap().push(raw);
        self.sent_tx.send(hash).await.ok();
        Ok(hash)
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TransactionReceipt>> {
        Ok(Some(TransactionReceipt {
            transaction_hash: tx_hash,
            block_number: Some(U64::from(1u64)),
            gas_used: None,
            status: Some(U64::from(1u64)),
        }))
    }

    async fn sync_progress(&self) -> Result<Option<SyncProgress>> {
        Ok(None)
    }
}

#[derive(Default)]
pub struct MockProducer {
    pub started: Mutex<Vec<EpochPrepared>>,
    pub stopped: AtomicBool,
    pub epoch_length: AtomicU64,
}

impl BlockProducer for MockProducer {
    fn start(&self, _operator: Address, epoch: &EpochPrepared, _rebase: bool) {
        self.started.lock().unwrap().push(epoch.clone());
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    fn set_nrb_epoch_length(&self, length: u64) {
        self.epoch_length.store(length, Ordering::SeqCst);
    }
}

pub struct MockTxPool {
    pub batches: Mutex<Vec<Vec<Transaction>>>,
    notify_tx: async_channel::Sender<()>,
    pub notify_rx: async_channel::Receiver<()>,
}

impl Default for MockTxPool {
    fn default() -> Self {
        let (notify_tx, notify_rx) = async_channel::unbounded();
        MockTxPool {
            batches: Default::default(),
            notify_tx,
            notify_rx,
        }
    }
}

#[async_trait]
impl TxPool for MockTxPool {
    async fn enqueue_request_txs(&self, txs: Vec<Transaction>) -> Result<()> {
        self.batches.lock().unwrap().push(txs);
        self.notify_tx.send(()).await.ok();
        Ok(())
    }
}

/// A mined child block with a hash derived from its number.
pub fn child_block(number: u64, is_request: bool) -> ChildBlock {
    ChildBlock {
        number,
        hash: keccak256(number.to_be_bytes()),
        is_request,
        state_root: B256::repeat_byte(0x01),
        transactions_root: B256::repeat_byte(0x02),
        receipts_root: B256::repeat_byte(0x03),
        transactions: Vec::new(),
    }
}
