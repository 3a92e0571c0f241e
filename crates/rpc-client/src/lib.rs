//! Root chain gateway.
//!
//! A thin adapter over the root chain's JSON-RPC endpoint: historical log
//! iteration, live log watching (polling with resumption), read-only
//! contract calls, raw transaction dispatch, receipt polling and sync
//! probing. The node core consumes the [`gateway::RootChainGateway`] trait;
//! [`rootchain_client::RootChainClient`] is the HTTP implementation.

pub mod contract;
pub mod error;
pub mod eth_client;
pub mod gateway;
pub mod rootchain_client;
pub mod rpc_types;
mod utils;
