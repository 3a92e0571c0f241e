//! HTTP implementation of the root chain gateway.
//!
//! Live watches are polling pumps over `eth_getLogs`: each pump resumes
//! from the block after the last one it delivered and pushes any RPC or
//! decoding failure onto the subscription's error channel, where the node
//! treats it as fatal.

use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use anyhow::Result;
use async_trait::async_trait;
use plasma_types::epoch::{BlockRecord, Epoch};
use plasma_types::event::{BlockFinalized, BlockSubmitted, EpochPrepared};
use plasma_types::request::{Ero, RequestBlock};

use crate::contract::{
    block_finalized_topic, block_submitted_topic, decode_block_finalized,
    decode_block_submitted, decode_epoch_prepared, epoch_prepared_topic, RootChain,
};
use crate::eth_client::EthClient;
use crate::gateway::{RootChainGateway, Subscription};
use crate::rpc_types::{CallRequest, Log, LogFilter, SyncProgress, TransactionReceipt};

const LOG_POLL_INTERVAL: Duration = Duration::from_secs(2);
const WATCH_CHANNEL_SIZE: usize = 16;

#[derive(Clone)]
pub struct RootChainClient {
    client: EthClient,
    contract: Address,
}

impl RootChainClient {
    pub fn new(client: EthClient, contract: Address) -> Self {
        RootChainClient { client, contract }
    }

    pub fn with_url(url: &str, contract: Address) -> Result<Self> {
        Ok(RootChainClient::new(EthClient::with_url(url)?, contract))
    }

    async fn call_contract<C: alloy_sol_types::SolCall>(&self, call: C) -> Result<C::Return> {
        let request = CallRequest {
            to: self.contract,
            data: call.abi_encode().into(),
        };
        let returned = self.client.call(&request).await?;
        C::abi_decode_returns(&returned)
            .map_err(|err| anyhow::anyhow!("decode {} return: {}", C::SIGNATURE, err))
    }

    async fn filter_logs(&self, from_block: u64, topic: B256) -> Result<Vec<Log>> {
        let filter = LogFilter {
            from_block: U64::from(from_block),
            to_block: None,
            address: self.contract,
            topics: vec![topic],
        };
        self.client.get_logs(&filter).await
    }

    /// Spawn a polling pump delivering decoded logs from `from_block` on,
    /// or from the next root-chain block when `from_block` is `None`.
    fn watch_logs<T, F>(&self, from_block: Option<u64>, topic: B256, decode: F) -> Subscription<T>
    where
        T: Send + 'static,
        F: Fn(&Log) -> Result<T> + Send + Sync + 'static,
    {
        let (event_tx, event_rx) = async_channel::bounded(WATCH_CHANNEL_SIZE);
        let (error_tx, error_rx) = async_channel::bounded(1);
        let client = self.client.clone();
        let contract = self.contract;

        tokio::spawn(async move {
            let mut next_block = match from_block {
                Some(number) => number,
                None => match client.block_number().await {
                    Ok(latest) => latest + 1,
                    Err(err) => {
                        let _ = error_tx.send(err).await;
                        return;
                    }
                },
            };
            loop {
                let batch = async {
                    let latest = client.block_number().await?;
                    if latest < next_block {
                        return Ok(Vec::new());
                    }
                    let filter = LogFilter {
                        from_block: U64::from(next_block),
                        to_block: Some(U64::from(latest)),
                        address: contract,
                        topics: vec![topic],
                    };
                    let logs = client.get_logs(&filter).await?;
                    let mut events = Vec::with_capacity(logs.len());
                    for log in &logs {
                        events.push(decode(log)?);
                    }
                    next_block = latest + 1;
                    anyhow::Ok(events)
                }
                .await;

                match batch {
                    Ok(events) => {
                        for event in events {
                            if event_tx.send(event).await.is_err() {
                                // subscriber gone
                                return;
                            }
                        }
                    }
                    Err(err) => {
                        let _ = error_tx.send(err).await;
                        return;
                    }
                }

                tokio::time::sleep(LOG_POLL_INTERVAL).await;
            }
        });

        Subscription {
            events: event_rx,
            errors: error_rx,
        }
    }
}

#[async_trait]
impl RootChainGateway for RootChainClient {
    async fn iterate_epoch_prepared(&self, from_block: u64) -> Result<Vec<EpochPrepared>> {
        let logs = self.filter_logs(from_block, epoch_prepared_topic()).await?;
        logs.iter().map(decode_epoch_prepared).collect()
    }

    async fn iterate_block_finalized(&self, from_block: u64) -> Result<Vec<BlockFinalized>> {
        let logs = self.filter_logs(from_block, block_finalized_topic()).await?;
        logs.iter().map(decode_block_finalized).collect()
    }

    fn watch_epoch_prepared(&self, from_block: u64) -> Subscription<EpochPrepared> {
        self.watch_logs(Some(from_block), epoch_prepared_topic(), decode_epoch_prepared)
    }

    fn watch_block_finalized(&self, from_block: u64) -> Subscription<BlockFinalized> {
        self.watch_logs(Some(from_block), block_finalized_topic(), decode_block_finalized)
    }

    fn watch_block_submitted(&self) -> Subscription<BlockSubmitted> {
        // submissions matter from now on, not historically
        self.watch_logs(None, block_submitted_topic(), decode_block_submitted)
    }

    async fn epoch(&self, fork: u64, epoch_number: u64) -> Result<Epoch> {
        let epoch = self
            .call_contract(RootChain::GetEpochCall {
                forkNumber: U256::from(fork),
                epochNumber: U256::from(epoch_number),
            })
            .await?;
        Ok(epoch.into())
    }

    async fn block(&self, fork: u64, block_number: u64) -> Result<BlockRecord> {
        let block = self
            .call_contract(RootChain::GetBlockCall {
                forkNumber: U256::from(fork),
                blockNumber: U256::from(block_number),
            })
            .await?;
        Ok(block.into())
    }

    async fn last_block(&self, fork: u64) -> Result<u64> {
        let number = self
            .call_contract(RootChain::LastBlockCall {
                forkNumber: U256::from(fork),
            })
            .await?;
        Ok(number.to::<u64>())
    }

    async fn orbs(&self, request_block_id: u64) -> Result<RequestBlock> {
        let orb = self
            .call_contract(RootChain::ORBsCall {
                index: U256::from(request_block_id),
            })
            .await?;
        Ok(orb.into())
    }

    async fn eros(&self, request_id: u64) -> Result<Ero> {
        let ero = self
            .call_contract(RootChain::EROsCall {
                index: U256::from(request_id),
            })
            .await?;
        Ok(ero.into())
    }

    async fn requestable_contracts(&self, rootchain: Address) -> Result<Address> {
        self.call_contract(RootChain::RequestableContractsCall { rootchain })
            .await
    }

    async fn ero_bytes(&self, request_id: u64) -> Result<Bytes> {
        self.call_contract(RootChain::GetEROBytesCall {
            requestId: U256::from(request_id),
        })
        .await
    }

    async fn current_fork(&self) -> Result<u64> {
        let fork = self.call_contract(RootChain::CurrentForkCall {}).await?;
        Ok(fork.to::<u64>())
    }

    async fn nre_length(&self) -> Result<u64> {
        let length = self.call_contract(RootChain::NRELengthCall {}).await?;
        Ok(length.to::<u64>())
    }

    async fn send_transaction(&self, raw: Bytes) -> Result<B256> {
        self.client.send_raw_transaction(&raw).await
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TransactionReceipt>> {
        self.client.transaction_receipt(&tx_hash).await
    }

    async fn sync_progress(&self) -> Result<Option<SyncProgress>> {
        self.client.sync_progress().await
    }
}
