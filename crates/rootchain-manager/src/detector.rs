//! Invalid exit detection on mined request blocks.

use std::sync::Arc;

use plasma_store::traits::chain_store::{ChainStore, ChainStoreWrite};
use plasma_utils::merkle::receipts_proof;
use tokio::sync::broadcast;

use crate::manager::{Inner, InvalidExit};

pub(crate) struct Detector {
    inner: Arc<Inner>,
}

impl Detector {
    pub fn new(inner: Arc<Inner>) -> Self {
        Detector { inner }
    }

    /// Watch mined blocks; during request epochs, record every failed
    /// receipt of a mined block as an invalid exit to challenge once the
    /// block is finalized.
    pub async fn run(self) {
        let inner = &self.inner;
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

                    let mut guard = inner.lock.write().await;
                    if !inner.env.is_request() {
                        continue;
                    }

                    let fork_number = match inner.gateway.current_fork().await {
                        Ok(fork) => fork,
                        Err(err) => {
                            log::warn!("failed to get current fork number, err: {:#}", err);
                            continue;
                        }
                    };

                    let receipts = inner
                        .store
                        .block_receipts(block.number, &block.hash)
                        .unwrap_or_default();

                    let mut invalid_exits = Vec::new();
                    let mut indices = Vec::new();
                    for (index, receipt) in receipts.iter().enumerate() {
                        if !receipt.failed() {
                            continue;
                        }
                        log::info!(
                            "Invalid exit detected, forkNumber: {}, blockNumber: {}, index: {}",
                            fork_number,
                            block.number,
                            index
                        );
                        invalid_exits.push(InvalidExit {
                            fork_number,
                            block_number: block.number,
                            receipt: receipt.clone(),
                            index: index as u64,
                            proof: receipts_proof(&receipts, index),
                        });
                        indices.push(index as u64);
                    }

                    if !indices.is_empty() {
                        inner.store.write_invalid_exit_receipts_lookup_entry(
                            fork_number,
                            block.number,
                            &block.hash,
                            indices,
                        );
                    }

                    // a re-mined block replaces its predecessor's record
                    guard
                        .invalid_exits
                        .entry(fork_number)
                        .or_default()
                        .insert(block.number, invalid_exits);
                }
                _ = inner.quit_rx.recv() => return,
            }
        }
    }
}
