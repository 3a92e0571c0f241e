//! Wire types of the root chain JSON-RPC surface.

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use serde::{Deserialize, Serialize};

/// `eth_getLogs` filter. An absent `to_block` means "latest".
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    pub from_block: U64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_block: Option<U64>,
    pub address: Address,
    pub topics: Vec<B256>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub block_number: Option<U64>,
    pub transaction_hash: Option<B256>,
    pub log_index: Option<U64>,
}

/// `eth_call` request object.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    pub to: Address,
    pub data: Bytes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub block_number: Option<U64>,
    pub gas_used: Option<U256>,
    pub status: Option<U64>,
}

impl TransactionReceipt {
    /// A zero status marks a reverted transaction.
    pub fn reverted(&self) -> bool {
        self.status.map(|status| status.is_zero()).unwrap_or(false)
    }
}

/// `eth_syncing` result: `false`, or the progress object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SyncStatus {
    Progress(SyncProgress),
    NotSyncing(bool),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncProgress {
    pub starting_block: U64,
    pub current_block: U64,
    pub highest_block: U64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_status_parses_both_shapes() {
        let not_syncing: SyncStatus = serde_json::from_str("false").unwrap();
        assert!(matches!(not_syncing, SyncStatus::NotSyncing(false)));

        let progress: SyncStatus = serde_json::from_str(
            r#"{"startingBlock":"0x0","currentBlock":"0x10","highestBlock":"0x20"}"#,
        )
        .unwrap();
        match progress {
            SyncStatus::Progress(progress) => {
                assert_eq!(progress.current_block, U64::from(0x10u64));
            }
            SyncStatus::NotSyncing(_) => panic!("expected progress"),
        }
    }

    #[test]
    fn log_filter_omits_absent_to_block() {
        let filter = LogFilter {
            from_block: U64::from(5u64),
            to_block: None,
            address: Address::ZERO,
            topics: vec![B256::ZERO],
        };
        let value = serde_json::to_value(&filter).unwrap();
        assert!(value.get("toBlock").is_none());
        assert_eq!(value["fromBlock"], "0x5");
    }
}
