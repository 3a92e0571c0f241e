//! Core data model shared by the plasma node crates.
//!
//! Everything that crosses a crate boundary lives here: the epoch and block
//! descriptors read from the root chain, the decoded contract events, the
//! request objects materialized into child-chain transactions, and the
//! positional lookup entries persisted by the store.

pub mod block;
pub mod epoch;
pub mod event;
pub mod lookup;
pub mod receipt;
pub mod request;
pub mod transaction;

pub use alloy_primitives::{Address, Bytes, B256, U256};
