//! Root chain contract binding.
//!
//! Call packing, return decoding and event decoding for the root chain
//! contract and the requestable-contract interface the child chain applies
//! requests through.

use alloy_primitives::{LogData, B256, U256};
use alloy_sol_types::{sol, SolEvent};
use anyhow::{anyhow, Context, Result};
use plasma_types::epoch::{BlockRecord, Epoch};
use plasma_types::event::{BlockFinalized, BlockSubmitted, EpochPrepared};
use plasma_types::request::{Ero, RequestBlock};

use crate::rpc_types::Log;

sol! {
    interface RootChain {
        struct PlasmaEpoch {
            uint64 startBlockNumber;
            uint64 endBlockNumber;
            uint64 firstRequestBlockId;
            bool isEmpty;
            bool initialized;
            bool isRequest;
            bool userActivated;
            bool rebase;
        }

        struct PlasmaBlock {
            uint64 epochNumber;
            bool isRequest;
            bool userActivated;
            bool finalized;
        }

        struct RequestBlockInfo {
            uint64 requestStart;
            uint64 requestEnd;
            bool submitted;
        }

        struct RequestInfo {
            bytes32 hash;
            bool isTransfer;
            bool isExit;
            address requestor;
            address to;
            uint256 value;
            bytes32 trieKey;
            bytes32 trieValue;
        }

        function NRELength() external view returns (uint256);
        function CurrentFork() external view returns (uint256);
        function LastBlock(uint256 forkNumber) external view returns (uint256);
        function GetEpoch(uint256 forkNumber, uint256 epochNumber) external view returns (PlasmaEpoch epoch);
        function GetBlock(uint256 forkNumber, uint256 blockNumber) external view returns (PlasmaBlock blk);
        function ORBs(uint256 index) external view returns (RequestBlockInfo orb);
        function EROs(uint256 index) external view returns (RequestInfo ero);
        function RequestableContracts(address rootchain) external view returns (address childchain);
        function GetEROBytes(uint256 requestId) external view returns (bytes eroBytes);

        function submitNRB(uint256 forkNumber, bytes32 stateRoot, bytes32 transactionsRoot, bytes32 receiptsRoot) external payable returns (bool success);
        function submitORB(uint256 forkNumber, bytes32 stateRoot, bytes32 transactionsRoot, bytes32 receiptsRoot) external payable returns (bool success);
        function challengeExit(uint256 forkNumber, uint256 blockNumber, uint256 index, bytes receiptData, bytes proof) external;

        event EpochPrepared(
            uint256 epochNumber,
            uint256 forkNumber,
            uint256 startBlockNumber,
            uint256 endBlockNumber,
            bool isRequest,
            bool userActivated,
            bool epochIsEmpty,
            bool rebase
        );
        event BlockFinalized(uint256 forkNumber, uint256 blockNumber);
        event BlockSubmitted(
            uint256 forkNumber,
            uint256 blockNumber,
            bytes32 stateRoot,
            bytes32 transactionsRoot,
            bytes32 receiptsRoot
        );
    }

    interface RequestableContractI {
        function applyRequestInChildChain(
            bool isExit,
            uint256 requestId,
            address requestor,
            bytes32 trieKey,
            bytes32 trieValue
        ) external returns (bool applied);
    }
}

/// Event signature topics the gateway filters logs by.
pub fn epoch_prepared_topic() -> B256 {
    RootChain::EpochPrepared::SIGNATURE_HASH
}

pub fn block_finalized_topic() -> B256 {
    RootChain::BlockFinalized::SIGNATURE_HASH
}

pub fn block_submitted_topic() -> B256 {
    RootChain::BlockSubmitted::SIGNATURE_HASH
}

fn to_primitive_log(log: &Log) -> alloy_primitives::Log {
    alloy_primitives::Log {
        address: log.address,
        data: LogData::new_unchecked(log.topics.clone(), log.data.clone()),
    }
}

fn raw_block_number(log: &Log) -> Result<u64> {
    let number = log.block_number.context("log misses block number")?;
    Ok(number.to::<u64>())
}

pub fn decode_epoch_prepared(log: &Log) -> Result<EpochPrepared> {
    let decoded = RootChain::EpochPrepared::decode_log(&to_primitive_log(log))
        .map_err(|err| anyhow!("decode EpochPrepared log: {}", err))?;
    Ok(EpochPrepared {
        epoch_number: decoded.epochNumber.to::<u64>(),
        fork_number: decoded.forkNumber.to::<u64>(),
        start_block: decoded.startBlockNumber.to::<u64>(),
        end_block: decoded.endBlockNumber.to::<u64>(),
        is_request: decoded.isRequest,
        user_activated: decoded.userActivated,
        is_empty: decoded.epochIsEmpty,
        rebase: decoded.rebase,
        raw_block_number: raw_block_number(log)?,
    })
}

pub fn decode_block_finalized(log: &Log) -> Result<BlockFinalized> {
    let decoded = RootChain::BlockFinalized::decode_log(&to_primitive_log(log))
        .map_err(|err| anyhow!("decode BlockFinalized log: {}", err))?;
    Ok(BlockFinalized {
        fork_number: decoded.forkNumber.to::<u64>(),
        block_number: decoded.blockNumber.to::<u64>(),
        raw_block_number: raw_block_number(log)?,
    })
}

pub fn decode_block_submitted(log: &Log) -> Result<BlockSubmitted> {
    let decoded = RootChain::BlockSubmitted::decode_log(&to_primitive_log(log))
        .map_err(|err| anyhow!("decode BlockSubmitted log: {}", err))?;
    Ok(BlockSubmitted {
        fork_number: decoded.forkNumber.to::<u64>(),
        block_number: decoded.blockNumber.to::<u64>(),
        raw_block_number: raw_block_number(log)?,
    })
}

impl From<RootChain::PlasmaEpoch> for Epoch {
    fn from(epoch: RootChain::PlasmaEpoch) -> Self {
        Epoch {
            start_block: epoch.startBlockNumber,
            end_block: epoch.endBlockNumber,
            first_request_block_id: epoch.firstRequestBlockId,
            is_empty: epoch.isEmpty,
            initialized: epoch.initialized,
            is_request: epoch.isRequest,
            user_activated: epoch.userActivated,
            rebase: epoch.rebase,
        }
    }
}

impl From<RootChain::PlasmaBlock> for BlockRecord {
    fn from(block: RootChain::PlasmaBlock) -> Self {
        BlockRecord {
            epoch_number: block.epochNumber,
            is_request: block.isRequest,
            user_activated: block.userActivated,
            finalized: block.finalized,
        }
    }
}

impl From<RootChain::RequestBlockInfo> for RequestBlock {
    fn from(orb: RootChain::RequestBlockInfo) -> Self {
        RequestBlock {
            request_start: orb.requestStart,
            request_end: orb.requestEnd,
            submitted: orb.submitted,
        }
    }
}

impl From<RootChain::RequestInfo> for Ero {
    fn from(ero: RootChain::RequestInfo) -> Self {
        Ero {
            hash: ero.hash,
            is_transfer: ero.isTransfer,
            is_exit: ero.isExit,
            requestor: ero.requestor,
            to: ero.to,
            value: ero.value,
            trie_key: ero.trieKey,
            trie_value: ero.trieValue,
        }
    }
}

/// Input of the child-chain transaction applying a non-transfer request.
pub fn apply_request_input(
    is_exit: bool,
    request_id: u64,
    requestor: alloy_primitives::Address,
    trie_key: B256,
    trie_value: B256,
) -> Vec<u8> {
    use alloy_sol_types::SolCall;

    RequestableContractI::applyRequestInChildChainCall {
        isExit: is_exit,
        requestId: U256::from(request_id),
        requestor,
        trieKey: trie_key,
        trieValue: trie_value,
    }
    .abi_encode()
}
