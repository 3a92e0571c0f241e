use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, B256};
use anyhow::Result;
use plasma_config::Config;
use plasma_rpc_client::gateway::RootChainGateway;
use plasma_store::traits::chain_store::{ChainStore, ChainStoreWrite};
use plasma_store::Store;
use plasma_types::block::ChildBlock;
use plasma_types::event::{BlockFinalized, EpochPrepared};
use plasma_types::receipt::Receipt;
use plasma_utils::wallet::Wallet;
use tokio::sync::{broadcast, RwLock};

use crate::detector::Detector;
use crate::handler::EventHandler;
use crate::ping;
use crate::state::RootChainState;
use crate::submitter::Submitter;
use crate::traits::{BlockProducer, EpochEnvironment, TxPool};

// The event channels stay as close to unbuffered as the channel crate
// allows; any buffering here would change backpressure on the event pump.
const EVENT_CHANNEL_SIZE: usize = 1;
const MINED_BLOCK_CHANNEL_SIZE: usize = 64;

/// Invoked when the node must shut down.
pub type StopFn = Arc<dyn Fn() + Send + Sync>;

/// A failed request receipt in a mined request block, with everything a
/// challenge transaction needs.
#[derive(Debug, Clone)]
pub struct InvalidExit {
    pub fork_number: u64,
    pub block_number: u64,
    pub receipt: Receipt,
    pub index: u64,
    pub proof: Vec<B256>,
}

/// fork => block number => invalid exits
pub type InvalidExitStore = HashMap<u64, HashMap<u64, Vec<InvalidExit>>>;

/// Everything guarded by the manager lock.
pub(crate) struct Protected {
    pub state: RootChainState,
    pub invalid_exits: InvalidExitStore,
}

pub(crate) struct Inner {
    pub contract: Address,
    pub operator: Address,
    pub network_id: u64,
    pub pending_interval: Duration,

    pub gateway: Arc<dyn RootChainGateway>,
    pub store: Store,
    pub tx_pool: Arc<dyn TxPool>,
    pub producer: Arc<dyn BlockProducer>,
    pub env: Arc<EpochEnvironment>,
    pub wallet: Arc<Wallet>,

    pub lock: RwLock<Protected>,

    pub mined_blocks: broadcast::Sender<ChildBlock>,
    pub epoch_prepared_tx: async_channel::Sender<EpochPrepared>,
    pub epoch_prepared_rx: async_channel::Receiver<EpochPrepared>,
    pub block_finalized_tx: async_channel::Sender<BlockFinalized>,
    pub block_finalized_rx: async_channel::Receiver<BlockFinalized>,
    pub quit_tx: async_channel::Sender<()>,
    pub quit_rx: async_channel::Receiver<()>,

    pub stop_fn: StopFn,
}

impl Inner {
    /// Persist the resume cursor after an event was fully handled.
    pub fn advance_cursor(&self, raw_block_number: u64) {
        self.store
            .set_last_processed_rootchain_block(raw_block_number);
    }
}

pub struct RootChainManager {
    inner: Arc<Inner>,
}

impl RootChainManager {
    /// Wire the manager against its collaborators and prime the producer
    /// with the root chain's epoch length.
    #[allow(clippy::too_many_arguments)]
    pub async fn setup(
        config: &Config,
        store: Store,
        gateway: Arc<dyn RootChainGateway>,
        tx_pool: Arc<dyn TxPool>,
        producer: Arc<dyn BlockProducer>,
        env: Arc<EpochEnvironment>,
        wallet: Arc<Wallet>,
        stop_fn: StopFn,
    ) -> Result<Self> {
        let epoch_length = match config.node.nrb_epoch_length {
            Some(length) => length,
            None => gateway.nre_length().await?,
        };
        producer.set_nrb_epoch_length(epoch_length);

        let current_fork = gateway.current_fork().await?;
        // The operator nonce restarts at zero and converges through the
        // submission loop's fee bumps; the wallet does not persist it.
        let state = RootChainState::new(
            current_fork,
            0,
            config.rootchain.gas_price,
            config.rootchain.cost_nrb,
        );

        let (epoch_prepared_tx, epoch_prepared_rx) = async_channel::bounded(EVENT_CHANNEL_SIZE);
        let (block_finalized_tx, block_finalized_rx) =
            async_channel::bounded(EVENT_CHANNEL_SIZE);
        let (quit_tx, quit_rx) = async_channel::bounded(1);
        let (mined_blocks, _) = broadcast::channel(MINED_BLOCK_CHANNEL_SIZE);

        let inner = Arc::new(Inner {
            contract: config.rootchain.contract,
            operator: config.wallet.operator,
            network_id: config.rootchain.network_id,
            pending_interval: Duration::from_secs(config.rootchain.pending_interval_secs),
            gateway,
            store,
            tx_pool,
            producer,
            env,
            wallet,
            lock: RwLock::new(Protected {
                state,
                invalid_exits: InvalidExitStore::default(),
            }),
            mined_blocks,
            epoch_prepared_tx,
            epoch_prepared_rx,
            block_finalized_tx,
            block_finalized_rx,
            quit_tx,
            quit_rx,
            stop_fn,
        });

        Ok(RootChainManager { inner })
    }

    /// The sender the block producer announces mined blocks on.
    pub fn mined_block_sender(&self) -> broadcast::Sender<ChildBlock> {
        self.inner.mined_blocks.clone()
    }

    /// Spawn the long-running tasks and join the event streams: historical
    /// events are drained inline, then the live pump takes over.
    pub async fn start(&self) -> Result<()> {
        tokio::spawn(EventHandler::new(self.inner.clone()).run());
        tokio::spawn(Submitter::new(self.inner.clone()).run());
        tokio::spawn(Detector::new(self.inner.clone()).run());

        self.watch_events().await?;

        tokio::spawn(ping::run(self.inner.clone()));
        Ok(())
    }

    /// Close the quit channel; every task observes it and returns.
    pub fn stop(&self) {
        self.inner.quit_tx.close();
    }

    async fn watch_events(&self) -> Result<()> {
        let inner = &self.inner;
        let handler = EventHandler::new(inner.clone());
        let start_block = inner.store.last_processed_rootchain_block().unwrap_or(0);

        log::info!("Iterating epoch prepared event");
        for event in inner.gateway.iterate_epoch_prepared(start_block).await? {
            match handler.handle_epoch_prepared(&event).await {
                Ok(()) => inner.advance_cursor(event.raw_block_number),
                Err(err) => log::error!("Failed to handle epoch prepared, err: {:#}", err),
            }
        }

        log::info!("Iterating block finalized event");
        for event in inner.gateway.iterate_block_finalized(start_block).await? {
            match handler.handle_block_finalized(&event).await {
                Ok(()) => inner.advance_cursor(event.raw_block_number),
                Err(err) => log::error!("Failed to handle block finalized, err: {:#}", err),
            }
        }

        log::info!(
            "Watching epoch prepared event, start block number: {}",
            start_block
        );
        let epoch_prepared = inner.gateway.watch_epoch_prepared(start_block);
        log::info!(
            "Watching block finalized event, start block number: {}",
            start_block
        );
        let block_finalized = inner.gateway.watch_block_finalized(start_block);

        let inner = inner.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = epoch_prepared.events.recv() => match event {
                        Ok(event) => {
                            if inner.epoch_prepared_tx.send(event).await.is_err() {
                                return;
                            }
                        }
                        Err(_) => return,
                    },
                    err = epoch_prepared.errors.recv() => {
                        if let Ok(err) = err {
                            log::error!("Epoch prepared event subscription error, err: {:#}", err);
                            (inner.stop_fn)();
                        }
                        return;
                    }
                    event = block_finalized.events.recv() => match event {
                        Ok(event) => {
                            if inner.block_finalized_tx.send(event).await.is_err() {
                                return;
                            }
                        }
                        Err(_) => return,
                    },
                    err = block_finalized.errors.recv() => {
                        if let Ok(err) = err {
                            log::error!("Block finalized event subscription error, err: {:#}", err);
                            (inner.stop_fn)();
                        }
                        return;
                    }
                    _ = inner.quit_rx.recv() => return,
                }
            }
        });

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn inner(&self) -> &Arc<Inner> {
        &self.inner
    }
}
