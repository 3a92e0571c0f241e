use std::sync::{Arc, Mutex};

use alloy_primitives::Address;
use anyhow::{Context, Result};
use async_trait::async_trait;
use plasma_config::Config;
use plasma_rootchain_manager::traits::{BlockProducer, EpochEnvironment, TxPool};
use plasma_rootchain_manager::{RootChainManager, StopFn};
use plasma_rpc_client::rootchain_client::RootChainClient;
use plasma_store::Store;
use plasma_types::block::ChildBlock;
use plasma_types::event::EpochPrepared;
use plasma_types::transaction::Transaction;
use plasma_utils::wallet::Wallet;
use tokio::sync::broadcast;

/// The seam toward the embedded chain runtime: the production runtime
/// consumes the producer commands and request batches exposed here and
/// announces mined blocks on the attached sender.
#[derive(Default)]
pub struct ChainAdapter {
    env: Arc<EpochEnvironment>,
    mined_blocks: Mutex<Option<broadcast::Sender<ChildBlock>>>,
}

impl ChainAdapter {
    pub fn epoch_environment(&self) -> Arc<EpochEnvironment> {
        self.env.clone()
    }

    pub fn attach_mined_block_sender(&self, sender: broadcast::Sender<ChildBlock>) {
        *self.mined_blocks.lock().expect("chain adapter lock") = Some(sender);
    }
}

#[async_trait]
impl TxPool for ChainAdapter {
    async fn enqueue_request_txs(&self, txs: Vec<Transaction>) -> Result<()> {
        log::debug!("Enqueue request txs, count: {}", txs.len());
        Ok(())
    }
}

impl BlockProducer for ChainAdapter {
    fn start(&self, operator: Address, epoch: &EpochPrepared, _rebase: bool) {
        log::debug!(
            "Start producer, operator: {}, epochNumber: {}",
            operator,
            epoch.epoch_number
        );
        self.env.set_is_request(epoch.is_request);
        self.env.set_completed(false);
    }

    fn stop(&self) {
        log::debug!("Stop producer");
    }

    fn set_nrb_epoch_length(&self, length: u64) {
        log::debug!("Set NRB epoch length, length: {}", length);
    }
}

pub async fn run(config: Config) -> Result<()> {
    if !config.store.path.as_os_str().is_empty() {
        log::warn!("persistent store engine not wired, using in-memory store");
    }
    let store = Store::open_tmp();

    let wallet = Arc::new(Wallet::from_config(&config.wallet).with_context(|| "init wallet")?);
    log::info!("Operator wallet: {}", wallet.address());

    let client = RootChainClient::with_url(&config.rootchain.endpoint, config.rootchain.contract)
        .with_context(|| "init rootchain client")?;

    let (exit_sender, exit_recv) = async_channel::bounded(100);
    let stop_fn: StopFn = {
        let exit_sender = exit_sender.clone();
        Arc::new(move || {
            exit_sender.try_send(()).ok();
        })
    };
    ctrlc::set_handler({
        let exit_sender = exit_sender.clone();
        move || {
            exit_sender.try_send(()).ok();
        }
    })?;

    let adapter = Arc::new(ChainAdapter::default());
    let manager = RootChainManager::setup(
        &config,
        store,
        Arc::new(client),
        adapter.clone(),
        adapter.clone(),
        adapter.epoch_environment(),
        wallet,
        stop_fn,
    )
    .await
    .with_context(|| "setup rootchain manager")?;

    adapter.attach_mined_block_sender(manager.mined_block_sender());

    manager.start().await.with_context(|| "start rootchain manager")?;
    log::info!("Rootchain manager started, contract: {}", config.rootchain.contract);

    let _ = exit_recv.recv().await;
    log::info!("Exiting...");
    manager.stop();

    Ok(())
}
