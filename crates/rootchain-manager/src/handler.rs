//! Serialized consumer of the root chain's epoch and finalization events.

use std::sync::Arc;

use alloy_primitives::U256;
use alloy_sol_types::SolCall;
use anyhow::{bail, Result};
use plasma_config::{
    REQUEST_TX_GAS_LIMIT, REQUEST_TX_GAS_PRICE, SUBMIT_BLOCK_GAS_LIMIT, SUBMIT_BLOCK_GAS_PRICE,
};
use plasma_rpc_client::contract::{apply_request_input, RootChain};
use plasma_store::traits::chain_store::ChainStore;
use plasma_types::event::{BlockFinalized, EpochPrepared};
use plasma_types::request::Ero;
use plasma_types::transaction::Transaction;
use tokio::sync::broadcast;

use crate::manager::Inner;

pub(crate) struct EventHandler {
    inner: Arc<Inner>,
}

impl EventHandler {
    pub fn new(inner: Arc<Inner>) -> Self {
        EventHandler { inner }
    }

    /// Pull from the two event channels until the node stops. One event is
    /// handled to completion before the next is taken.
    pub async fn run(self) {
        loop {
            tokio::select! {
                event = self.inner.epoch_prepared_rx.recv() => match event {
                    Ok(event) => match self.handle_epoch_prepared(&event).await {
                        Ok(()) => self.inner.advance_cursor(event.raw_block_number),
                        Err(err) => log::error!("Failed to handle epoch prepared, err: {:#}", err),
                    },
                    Err(_) => return,
                },
                event = self.inner.block_finalized_rx.recv() => match event {
                    Ok(event) => match self.handle_block_finalized(&event).await {
                        Ok(()) => self.inner.advance_cursor(event.raw_block_number),
                        Err(err) => log::error!("Failed to handle block finalized, err: {:#}", err),
                    },
                    Err(_) => return,
                },
                _ = self.inner.quit_rx.recv() => return,
            }
        }
    }

    pub async fn handle_epoch_prepared(&self, event: &EpochPrepared) -> Result<()> {
        let inner = &self.inner;

        if event.is_empty {
            log::info!("epoch is empty, jump to next epoch");
            return Ok(());
        }

        let mut guard = inner.lock.write().await;

        log::info!(
            "RootChain epoch prepared, epochNumber: {}, epochLength: {}, isRequest: {}, \
             userActivated: {}, forkNumber: {}, isRebase: {}",
            event.epoch_number,
            event.block_count(),
            event.is_request,
            event.user_activated,
            event.fork_number,
            event.rebase
        );

        inner.producer.start(inner.operator, event, false);

        if event.is_request {
            // Subscribe before any request block can be mined.
            let mut mined = inner.mined_blocks.subscribe();

            let num_orbs = event.block_count();
            let current_fork = guard.state.current_fork();
            let epoch = inner.gateway.epoch(current_fork, event.epoch_number).await?;
            let mut request_block_id = epoch.first_request_block_id;
            let mut bodies: Vec<Vec<Transaction>> = Vec::with_capacity(num_orbs as usize);

            log::debug!(
                "Fetching ORBs, epochNumber: {}, numORBs: {}, requestBlockId: {}",
                event.epoch_number,
                num_orbs,
                request_block_id
            );

            for _block_number in event.start_block..=event.end_block {
                let orb = inner.gateway.orbs(request_block_id).await?;
                let mut body = Vec::with_capacity(orb.request_count() as usize);

                for request_id in orb.request_start..=orb.request_end {
                    let request = inner.gateway.eros(request_id).await?;
                    let tx = self.materialize_request_tx(&request, request_id).await?;

                    // The contract's canonical bytes are authoritative; the
                    // local materialization is what the producer mines.
                    match inner.gateway.ero_bytes(request_id).await {
                        Ok(ero_bytes) => {
                            if ero_bytes.as_ref() != tx.rlp_bytes().as_slice() {
                                log::error!(
                                    "Request tx differs from canonical bytes, requestId: {}, \
                                     canonical: 0x{}, local: 0x{}",
                                    request_id,
                                    hex::encode(&ero_bytes),
                                    hex::encode(tx.rlp_bytes())
                                );
                            }
                        }
                        Err(err) => {
                            log::error!("Failed to get request bytes, err: {:#}", err)
                        }
                    }

                    body.push(tx);
                }

                log::info!(
                    "Request txs fetched, requestBlockId: {}, numRequests: {}",
                    request_block_id,
                    body.len()
                );

                bodies.push(body);
                request_block_id += 1;

                // yield the lock between request block constructions
                drop(guard);
                guard = inner.lock.write().await;
            }

            let mut num_mined: u64 = 0;
            while num_mined < num_orbs {
                inner
                    .tx_pool
                    .enqueue_request_txs(bodies[num_mined as usize].clone())
                    .await?;

                log::info!("Waiting new request block mined event...");
                let block = loop {
                    match mined.recv().await {
                        Ok(block) => break block,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            log::warn!("Mined block notifications lagged, skipped: {}", skipped)
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            bail!("mined block channel closed")
                        }
                    }
                };

                log::info!("New request block is mined, number: {}", block.number);
                if !block.is_request {
                    bail!("invalid request block type");
                }

                let receipts = inner
                    .store
                    .block_receipts(block.number, &block.hash)
                    .unwrap_or_default();
                for receipt in &receipts {
                    if receipt.failed() {
                        log::error!(
                            "Request transaction is reverted, blockNumber: {}, hash: {:#x}",
                            block.number,
                            receipt.tx_hash
                        );
                    }
                }

                num_mined += 1;
            }
        }

        drop(guard);
        Ok(())
    }

    pub async fn handle_block_finalized(&self, event: &BlockFinalized) -> Result<()> {
        let inner = &self.inner;
        let mut guard = inner.lock.write().await;

        log::info!(
            "RootChain block finalized, forkNumber: {}, blockNumber: {}",
            event.fork_number,
            event.block_number
        );

        let block = inner
            .gateway
            .block(event.fork_number, event.block_number)
            .await?;
        if !block.is_request {
            return Ok(());
        }

        let invalid_exits = guard
            .invalid_exits
            .get_mut(&event.fork_number)
            .and_then(|blocks| blocks.remove(&event.block_number))
            .unwrap_or_default();

        for exit in &invalid_exits {
            let mut proof = Vec::with_capacity(exit.proof.len() * 32);
            for hash in &exit.proof {
                proof.extend_from_slice(hash.as_slice());
            }

            let input = RootChain::challengeExitCall {
                forkNumber: U256::from(event.fork_number),
                blockNumber: U256::from(event.block_number),
                index: U256::from(exit.index),
                receiptData: exit.receipt.rlp_bytes().into(),
                proof: proof.into(),
            }
            .abi_encode();

            let challenge_tx = Transaction {
                nonce: guard.state.nonce(),
                gas_price: U256::from(SUBMIT_BLOCK_GAS_PRICE),
                gas: SUBMIT_BLOCK_GAS_LIMIT,
                to: Some(inner.contract),
                value: U256::ZERO,
                input: input.into(),
            };

            let signed = match inner.wallet.sign_transaction(challenge_tx, inner.network_id) {
                Ok(signed) => signed,
                Err(err) => {
                    log::error!("Failed to sign challengeExit, err: {:#}", err);
                    continue;
                }
            };

            match inner.gateway.send_transaction(signed.raw.clone()).await {
                Ok(_) => {
                    guard.state.inc_nonce();
                    log::info!(
                        "challengeExit is submitted, exit request number: {}, hash: {:#x}",
                        exit.index,
                        signed.hash
                    );
                }
                Err(err) => log::error!("Failed to send challengeExit, err: {:#}", err),
            }
        }

        Ok(())
    }

    async fn materialize_request_tx(&self, request: &Ero, request_id: u64) -> Result<Transaction> {
        let (to, input) = if request.is_transfer {
            (request.requestor, Vec::new())
        } else {
            let to = self
                .inner
                .gateway
                .requestable_contracts(request.to)
                .await?;
            let input = apply_request_input(
                request.is_exit,
                request_id,
                request.requestor,
                request.trie_key,
                request.trie_value,
            );
            log::debug!("Request tx input, payload: 0x{}", hex::encode(&input));
            (to, input)
        };

        Ok(Transaction {
            nonce: 0,
            gas_price: U256::from(REQUEST_TX_GAS_PRICE),
            gas: REQUEST_TX_GAS_LIMIT,
            to: Some(to),
            value: request.value,
            input: input.into(),
        })
    }
}
