//! Block submission with adaptive resubmission.
//!
//! Every mined child block is packed into a `submitNRB` or `submitORB`
//! transaction. The submitter then waits for the contract's BlockSubmitted
//! event; while it is pending, a periodic check bumps the fee and resubmits
//! whenever the operator nonce has not moved. Confirmation backs the fee
//! off again. The manager lock is taken when the mined block arrives and
//! released once the submission is confirmed, which serializes submissions
//! against concurrently issued challenges.

use std::sync::Arc;

use alloy_primitives::{B256, U256};
use alloy_sol_types::SolCall;
use anyhow::Result;
use plasma_config::SUBMIT_BLOCK_GAS_LIMIT;
use plasma_rpc_client::contract::RootChain;
use plasma_types::block::ChildBlock;
use plasma_types::transaction::Transaction;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use crate::manager::Inner;

/// One step of the fee adaptation: back off after a timely confirmation,
/// bump while confirmation stalls. Integer arithmetic truncates the
/// division first; the result never reaches zero.
fn adjusted_gas_price(gas_price: U256, sufficient: bool) -> U256 {
    let adjusted = if sufficient {
        (gas_price / U256::from(4u64)) * U256::from(3u64)
    } else {
        (gas_price / U256::from(2u64)) * U256::from(3u64)
    };
    adjusted.max(U256::from(1u64))
}

pub(crate) struct Submitter {
    inner: Arc<Inner>,
}

impl Submitter {
    pub fn new(inner: Arc<Inner>) -> Self {
        Submitter { inner }
    }

    pub async fn run(self) {
        let inner = &self.inner;
        let block_submitted = inner.gateway.watch_block_submitted();
        let mut mined = inner.mined_blocks.subscribe();

        loop {
            tokio::select! {
                block = mined.recv() => {
                    let block = match block {
                        Ok(block) => block,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            log::warn!("Mined block notifications lagged, skipped: {}", skipped);
                            continue;
                        }
                        Err(broadcast::error::RecvError::Closed) => return,
                    };

                    // the epoch is done; wait for the next announcement
                    if inner.env.completed() {
                        inner.producer.stop();
                    }

                    let mut guard = inner.lock.write().await;

                    let func_name = if inner.env.is_request() {
                        "submitORB"
                    } else {
                        "submitNRB"
                    };
                    let current_fork = guard.state.current_fork();
                    let cost_nrb = guard.state.cost_nrb();
                    let mut nonce = guard.state.nonce();
                    let mut gas_price = guard.state.gas_price();

                    let mut tx_hash = match self
                        .submit(func_name, &block, current_fork, nonce, gas_price, cost_nrb)
                        .await
                    {
                        Ok(hash) => Some(hash),
                        Err(err) => {
                            log::error!("Failed to submit {}, err: {:#}", func_name, err);
                            None
                        }
                    };

                    let mut pending_interval = tokio::time::interval(inner.pending_interval);
                    pending_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    // the first tick completes immediately
                    pending_interval.tick().await;

                    'pending: loop {
                        tokio::select! {
                            _ = pending_interval.tick() => {
                                log::info!("Mining submit block timed out");
                                if nonce == guard.state.nonce() {
                                    let original = gas_price;
                                    gas_price = adjusted_gas_price(gas_price, false);
                                    guard.state.set_gas_price(gas_price);
                                    log::info!(
                                        "Adjust gas price, original: {}, new: {}",
                                        original,
                                        gas_price
                                    );
                                    match self
                                        .submit(func_name, &block, current_fork, nonce, gas_price, cost_nrb)
                                        .await
                                    {
                                        Ok(hash) => tx_hash = Some(hash),
                                        Err(err) => {
                                            log::error!("Failed to submit {}, err: {:#}", func_name, err)
                                        }
                                    }
                                } else {
                                    nonce = guard.state.nonce();
                                }
                            }
                            event = block_submitted.events.recv() => {
                                if event.is_err() {
                                    log::error!("Block submitted event subscription closed");
                                    (inner.stop_fn)();
                                    return;
                                }
                                guard.state.inc_nonce();
                                let original = gas_price;
                                gas_price = adjusted_gas_price(gas_price, true);
                                guard.state.set_gas_price(gas_price);
                                log::info!(
                                    "Adjust gas price, original: {}, new: {}",
                                    original,
                                    gas_price
                                );
                                break 'pending;
                            }
                            err = block_submitted.errors.recv() => {
                                if let Ok(err) = err {
                                    log::error!(
                                        "Block submitted event subscription error, err: {:#}",
                                        err
                                    );
                                    (inner.stop_fn)();
                                }
                                return;
                            }
                            _ = inner.quit_rx.recv() => return,
                        }
                    }

                    drop(guard);

                    if let Some(hash) = tx_hash {
                        match inner.gateway.transaction_receipt(hash).await {
                            Ok(Some(receipt)) if receipt.reverted() => {
                                log::error!("{} is reverted, hash: {:#x}", func_name, hash)
                            }
                            Ok(Some(_)) => log::info!(
                                "Block is submitted, func: {}, number: {}, hash: {:#x}, gasprice: {}",
                                func_name,
                                block.number,
                                hash,
                                gas_price
                            ),
                            Ok(None) => {
                                log::warn!("Submit receipt not found, hash: {:#x}", hash)
                            }
                            Err(err) => {
                                log::error!("Failed to get {} receipt, err: {:#}", func_name, err)
                            }
                        }
                    }
                }
                _ = inner.quit_rx.recv() => return,
            }
        }
    }

    async fn submit(
        &self,
        func_name: &str,
        block: &ChildBlock,
        fork: u64,
        nonce: u64,
        gas_price: U256,
        cost_nrb: U256,
    ) -> Result<B256> {
        let inner = &self.inner;

        let input = if func_name == "submitORB" {
            RootChain::submitORBCall {
                forkNumber: U256::from(fork),
                stateRoot: block.state_root,
                transactionsRoot: block.transactions_root,
                receiptsRoot: block.receipts_root,
            }
            .abi_encode()
        } else {
            RootChain::submitNRBCall {
                forkNumber: U256::from(fork),
                stateRoot: block.state_root,
                transactionsRoot: block.transactions_root,
                receiptsRoot: block.receipts_root,
            }
            .abi_encode()
        };

        let submit_tx = Transaction {
            nonce,
            gas_price,
            gas: SUBMIT_BLOCK_GAS_LIMIT,
            to: Some(inner.contract),
            value: cost_nrb,
            input: input.into(),
        };
        let signed = inner.wallet.sign_transaction(submit_tx, inner.network_id)?;
        let hash = inner.gateway.send_transaction(signed.raw.clone()).await?;
        log::info!("Submit block to rootchain, func: {}, hash: {:#x}", func_name, hash);
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sufficient_adjustment_backs_off() {
        assert_eq!(
            adjusted_gas_price(U256::from(1000u64), true),
            U256::from(750u64)
        );
        // truncating division first
        assert_eq!(adjusted_gas_price(U256::from(10u64), true), U256::from(6u64));
    }

    #[test]
    fn insufficient_adjustment_bumps() {
        assert_eq!(
            adjusted_gas_price(U256::from(1000u64), false),
            U256::from(1500u64)
        );
        assert_eq!(
            adjusted_gas_price(U256::from(11u64), false),
            U256::from(15u64)
        );
    }

    #[test]
    fn gas_price_stays_positive() {
        let mut gas_price = U256::from(5u64);
        for _ in 0..64 {
            gas_price = adjusted_gas_price(gas_price, true);
            assert!(gas_price > U256::ZERO);
        }
        assert_eq!(gas_price, U256::from(1u64));
    }
}
