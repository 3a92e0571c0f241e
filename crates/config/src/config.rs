use std::path::PathBuf;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_COST_NRB, DEFAULT_GAS_PRICE, DEFAULT_PENDING_INTERVAL_SECS,
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub node: NodeConfig,
    pub rootchain: RootChainConfig,
    pub wallet: WalletConfig,
    pub store: StoreConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Epoch length pushed to the block producer is read from the root
    /// chain at startup; this only overrides it for development setups.
    pub nrb_epoch_length: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RootChainConfig {
    /// JSON-RPC endpoint of the root chain node.
    pub endpoint: String,
    /// Address of the deployed root chain contract.
    pub contract: Address,
    /// Network id used for operator signatures.
    pub network_id: u64,
    /// Seconds between submission resubmit checks.
    pub pending_interval_secs: u64,
    /// Wei attached to every block submission.
    pub cost_nrb: U256,
    /// Starting gas price for submissions, in wei.
    pub gas_price: U256,
}

impl Default for RootChainConfig {
    fn default() -> Self {
        RootChainConfig {
            endpoint: "http://127.0.0.1:8545".to_string(),
            contract: Address::ZERO,
            network_id: 1337,
            pending_interval_secs: DEFAULT_PENDING_INTERVAL_SECS,
            cost_nrb: U256::from(DEFAULT_COST_NRB),
            gas_price: U256::from(DEFAULT_GAS_PRICE),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Path of a hex-encoded 32-byte private key file.
    pub privkey_path: PathBuf,
    /// Operator account the producer mines under.
    pub operator: Address,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Blank path means an in-memory store.
    pub path: PathBuf,
}
