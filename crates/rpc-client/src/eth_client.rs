//! JSON-RPC client of the root chain node.

use alloy_primitives::{Bytes, B256, U64};
use anyhow::Result;
use async_jsonrpc_client::{HttpClient, Output, Params as ClientParams, Transport};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::instrument;

use crate::error::RpcError;
use crate::rpc_types::{CallRequest, Log, LogFilter, SyncProgress, SyncStatus, TransactionReceipt};
use crate::utils::{to_result, DEFAULT_HTTP_TIMEOUT};

#[derive(Clone)]
pub struct EthClient(HttpClient);

impl EthClient {
    pub fn new(client: HttpClient) -> Self {
        Self(client)
    }

    pub fn with_url(url: &str) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build(url)?;
        Ok(Self::new(client))
    }

    fn client(&self) -> &HttpClient {
        &self.0
    }

    #[instrument(skip_all, fields(method = method))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<ClientParams>,
    ) -> Result<T> {
        let response: Output = self
            .client()
            .request(method, params)
            .await
            .map_err(|err| RpcError::transport(method, err))?;
        let response_str = response.to_string();
        match to_result::<T>(method, response) {
            Ok(r) => Ok(r),
            Err(err) => {
                log::error!(
                    "[rootchain-client] RPC call failed, method: {}, response: {}",
                    method,
                    response_str
                );
                Err(err.into())
            }
        }
    }

    pub async fn block_number(&self) -> Result<u64> {
        let number: U64 = self.request("eth_blockNumber", None).await?;
        Ok(number.to::<u64>())
    }

    pub async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>> {
        self.request(
            "eth_getLogs",
            Some(ClientParams::Array(vec![json!(filter)])),
        )
        .await
    }

    /// Read-only contract call against the latest state.
    pub async fn call(&self, request: &CallRequest) -> Result<Bytes> {
        self.request(
            "eth_call",
            Some(ClientParams::Array(vec![json!(request), json!("latest")])),
        )
        .await
    }

    pub async fn send_raw_transaction(&self, raw: &Bytes) -> Result<B256> {
        self.request(
            "eth_sendRawTransaction",
            Some(ClientParams::Array(vec![json!(raw)])),
        )
        .await
    }

    pub async fn transaction_receipt(
        &self,
        tx_hash: &B256,
    ) -> Result<Option<TransactionReceipt>> {
        self.request(
            "eth_getTransactionReceipt",
            Some(ClientParams::Array(vec![json!(tx_hash)])),
        )
        .await
    }

    pub async fn sync_progress(&self) -> Result<Option<SyncProgress>> {
        let status: SyncStatus = self.request("eth_syncing", None).await?;
        match status {
            SyncStatus::Progress(progress) => Ok(Some(progress)),
            SyncStatus::NotSyncing(_) => Ok(None),
        }
    }
}
