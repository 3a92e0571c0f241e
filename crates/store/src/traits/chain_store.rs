//! Index accessors over the column store.
//!
//! Reads never fail loudly: a missing entry is `None`, and a corrupt entry
//! is logged and treated as missing. Writes treat a database refusal as an
//! invariant violation and abort.

use std::collections::HashMap;

use alloy_primitives::B256;
use alloy_rlp::{Decodable, Encodable};
use plasma_db::schema::{
    COLUMN_BLOCK_BODY, COLUMN_BLOCK_RECEIPTS, COLUMN_BLOOM_BITS,
    COLUMN_INVALID_EXIT_RECEIPTS_LOOKUP, COLUMN_META, COLUMN_TX_LOOKUP,
    META_LAST_PROCESSED_ROOTCHAIN_BLOCK_KEY,
};
use plasma_types::block::ChildBlock;
use plasma_types::lookup::{InvalidExitReceiptsLookupEntry, TxLookupEntry};
use plasma_types::receipt::Receipt;
use plasma_types::transaction::Transaction;

use crate::traits::kv_store::{KVStoreRead, KVStoreWrite};

fn block_key(number: u64, hash: &B256) -> [u8; 40] {
    let mut key = [0u8; 40];
    key[..8].copy_from_slice(&number.to_be_bytes());
    key[8..].copy_from_slice(hash.as_slice());
    key
}

fn invalid_exit_receipts_lookup_key(fork: u64, number: u64, hash: &B256) -> [u8; 48] {
    let mut key = [0u8; 48];
    key[..8].copy_from_slice(&fork.to_be_bytes());
    key[8..16].copy_from_slice(&number.to_be_bytes());
    key[16..].copy_from_slice(hash.as_slice());
    key
}

fn bloom_bits_key(bit: u32, section: u64, head: &B256) -> [u8; 44] {
    let mut key = [0u8; 44];
    key[..4].copy_from_slice(&bit.to_be_bytes());
    key[4..12].copy_from_slice(&section.to_be_bytes());
    key[12..].copy_from_slice(head.as_slice());
    key
}

fn encode<T: Encodable>(value: &T) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.length());
    value.encode(&mut out);
    out
}

pub trait ChainStore: KVStoreRead {
    /// Root-chain block number the event loops resume from.
    fn last_processed_rootchain_block(&self) -> Option<u64> {
        let data = self.get(COLUMN_META, META_LAST_PROCESSED_ROOTCHAIN_BLOCK_KEY)?;
        let bytes: [u8; 8] = data.as_ref().try_into().ok()?;
        Some(u64::from_be_bytes(bytes))
    }

    fn block_body(&self, number: u64, hash: &B256) -> Option<Vec<Transaction>> {
        let data = self.get(COLUMN_BLOCK_BODY, &block_key(number, hash))?;
        match Vec::<Transaction>::decode(&mut data.as_ref()) {
            Ok(body) => Some(body),
            Err(err) => {
                log::error!("Invalid block body RLP, number: {}, err: {}", number, err);
                None
            }
        }
    }

    fn block_receipts(&self, number: u64, hash: &B256) -> Option<Vec<Receipt>> {
        let data = self.get(COLUMN_BLOCK_RECEIPTS, &block_key(number, hash))?;
        match Vec::<Receipt>::decode(&mut data.as_ref()) {
            Ok(receipts) => Some(receipts),
            Err(err) => {
                log::error!(
                    "Invalid block receipts RLP, number: {}, err: {}",
                    number,
                    err
                );
                None
            }
        }
    }

    /// Positional metadata of a transaction by its hash.
    fn tx_lookup_entry(&self, tx_hash: &B256) -> Option<TxLookupEntry> {
        let data = self.get(COLUMN_TX_LOOKUP, tx_hash.as_slice())?;
        match TxLookupEntry::decode(&mut data.as_ref()) {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::error!(
                    "Invalid transaction lookup entry RLP, hash: {:#x}, err: {}",
                    tx_hash,
                    err
                );
                None
            }
        }
    }

    /// A transaction by hash, with its positional metadata.
    fn transaction(&self, tx_hash: &B256) -> Option<(Transaction, B256, u64, u64)> {
        let entry = self.tx_lookup_entry(tx_hash)?;
        let body = self.block_body(entry.block_number, &entry.block_hash)?;
        match body.into_iter().nth(entry.index as usize) {
            Some(tx) => Some((tx, entry.block_hash, entry.block_number, entry.index)),
            None => {
                log::error!(
                    "Transaction referenced missing, number: {}, hash: {:#x}, index: {}",
                    entry.block_number,
                    entry.block_hash,
                    entry.index
                );
                None
            }
        }
    }

    /// A receipt by transaction hash, with its positional metadata.
    fn receipt(&self, tx_hash: &B256) -> Option<(Receipt, B256, u64, u64)> {
        let entry = self.tx_lookup_entry(tx_hash)?;
        let receipts = self.block_receipts(entry.block_number, &entry.block_hash)?;
        match receipts.into_iter().nth(entry.index as usize) {
            Some(receipt) => {
                Some((receipt, entry.block_hash, entry.block_number, entry.index))
            }
            None => {
                log::error!(
                    "Receipt referenced missing, number: {}, hash: {:#x}, index: {}",
                    entry.block_number,
                    entry.block_hash,
                    entry.index
                );
                None
            }
        }
    }

    fn invalid_exit_receipts_lookup_entry(
        &self,
        fork: u64,
        number: u64,
        hash: &B256,
    ) -> Option<InvalidExitReceiptsLookupEntry> {
        let key = invalid_exit_receipts_lookup_key(fork, number, hash);
        let data = self.get(COLUMN_INVALID_EXIT_RECEIPTS_LOOKUP, &key)?;
        match InvalidExitReceiptsLookupEntry::decode(&mut data.as_ref()) {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::error!(
                    "Invalid invalid exit receipt lookup entry RLP, hash: {:#x}, err: {}",
                    hash,
                    err
                );
                None
            }
        }
    }

    /// The failed receipts of a request block, keyed by their position.
    fn invalid_exit_receipts(
        &self,
        fork: u64,
        number: u64,
        hash: &B256,
    ) -> Option<HashMap<u64, Receipt>> {
        let entry = self.invalid_exit_receipts_lookup_entry(fork, number, hash)?;
        let receipts = self.block_receipts(entry.block_number, &entry.block_hash)?;
        if receipts.is_empty() {
            return None;
        }
        let mut invalid_exit_receipts = HashMap::with_capacity(entry.indices.len());
        for index in entry.indices {
            let receipt = receipts.get(index as usize)?;
            invalid_exit_receipts.insert(index, receipt.clone());
        }
        Some(invalid_exit_receipts)
    }

    fn bloom_bits(&self, bit: u32, section: u64, head: &B256) -> Option<Vec<u8>> {
        self.get(COLUMN_BLOOM_BITS, &bloom_bits_key(bit, section, head))
            .map(|data| data.into_vec())
    }
}

impl<T: KVStoreRead> ChainStore for T {}

pub trait ChainStoreWrite: KVStoreWrite {
    fn set_last_processed_rootchain_block(&self, number: u64) {
        self.insert_raw(
            COLUMN_META,
            META_LAST_PROCESSED_ROOTCHAIN_BLOCK_KEY,
            &number.to_be_bytes(),
        )
        .expect("store last processed rootchain block");
    }

    fn write_block_body(&self, number: u64, hash: &B256, body: &[Transaction]) {
        self.insert_raw(
            COLUMN_BLOCK_BODY,
            &block_key(number, hash),
            &encode(&body.to_vec()),
        )
            .expect("store block body");
    }

    fn write_block_receipts(&self, number: u64, hash: &B256, receipts: &[Receipt]) {
        self.insert_raw(
            COLUMN_BLOCK_RECEIPTS,
            &block_key(number, hash),
            &encode(&receipts.to_vec()),
        )
        .expect("store block receipts");
    }

    /// Store a positional lookup entry for every transaction of a block.
    fn write_tx_lookup_entries(&self, block: &ChildBlock) {
        for (index, tx) in block.transactions.iter().enumerate() {
            let entry = TxLookupEntry {
                block_hash: block.hash,
                block_number: block.number,
                index: index as u64,
            };
            self.insert_raw(COLUMN_TX_LOOKUP, tx.hash().as_slice(), &encode(&entry))
                .expect("store transaction lookup entry");
        }
    }

    fn delete_tx_lookup_entry(&self, tx_hash: &B256) {
        self.delete(COLUMN_TX_LOOKUP, tx_hash.as_slice())
            .expect("delete transaction lookup entry");
    }

    fn write_invalid_exit_receipts_lookup_entry(
        &self,
        fork: u64,
        number: u64,
        hash: &B256,
        indices: Vec<u64>,
    ) {
        let entry = InvalidExitReceiptsLookupEntry {
            block_hash: *hash,
            block_number: number,
            indices,
        };
        let key = invalid_exit_receipts_lookup_key(fork, number, hash);
        self.insert_raw(COLUMN_INVALID_EXIT_RECEIPTS_LOOKUP, &key, &encode(&entry))
            .expect("store invalid exit receipt lookup entry");
    }

    fn delete_invalid_exit_receipts_lookup_entry(
        &self,
        fork: u64,
        number: u64,
        hash: &B256,
    ) {
        let key = invalid_exit_receipts_lookup_key(fork, number, hash);
        self.delete(COLUMN_INVALID_EXIT_RECEIPTS_LOOKUP, &key)
            .expect("delete invalid exit receipt lookup entry");
    }

    fn write_bloom_bits(&self, bit: u32, section: u64, head: &B256, bits: &[u8]) {
        self.insert_raw(COLUMN_BLOOM_BITS, &bloom_bits_key(bit, section, head), bits)
            .expect("store bloom bits");
    }

    /// Drop a block's body, receipts and per-transaction lookup entries.
    fn delete_block(&self, block: &ChildBlock) {
        for tx in &block.transactions {
            self.delete_tx_lookup_entry(&tx.hash());
        }
        self.delete(COLUMN_BLOCK_BODY, &block_key(block.number, &block.hash))
            .expect("delete block body");
        self.delete(
            COLUMN_BLOCK_RECEIPTS,
            &block_key(block.number, &block.hash),
        )
        .expect("delete block receipts");
    }
}

impl<T: KVStoreWrite> ChainStoreWrite for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store;
    use alloy_primitives::{b256, Bytes, U256};
    use plasma_types::receipt::ReceiptStatus;

    fn sample_block() -> ChildBlock {
        let transactions = (0..3u64)
            .map(|nonce| Transaction {
                nonce,
                gas_price: U256::from(1u64),
                gas: 21_000,
                to: None,
                value: U256::ZERO,
                input: Bytes::new(),
            })
            .collect();
        ChildBlock {
            number: 9,
            hash: b256!("0000000000000000000000000000000000000000000000000000000000000909"),
            transactions,
            ..Default::default()
        }
    }

    fn sample_receipts(block: &ChildBlock) -> Vec<Receipt> {
        block
            .transactions
            .iter()
            .enumerate()
            .map(|(i, tx)| Receipt {
                status: if i == 1 {
                    ReceiptStatus::Failed
                } else {
                    ReceiptStatus::Successful
                },
                gas_used: 21_000,
                tx_hash: tx.hash(),
            })
            .collect()
    }

    #[test]
    fn tx_lookup_round_trip() {
        let store = Store::open_tmp();
        let block = sample_block();
        store.write_block_body(block.number, &block.hash, &block.transactions);
        store.write_tx_lookup_entries(&block);

        for (index, tx) in block.transactions.iter().enumerate() {
            let (found, block_hash, number, position) =
                store.transaction(&tx.hash()).expect("transaction");
            assert_eq!(&found, tx);
            assert_eq!(block_hash, block.hash);
            assert_eq!(number, block.number);
            assert_eq!(position, index as u64);
        }

        let hash = block.transactions[0].hash();
        store.delete_tx_lookup_entry(&hash);
        assert!(store.tx_lookup_entry(&hash).is_none());
        assert!(store.transaction(&hash).is_none());
    }

    #[test]
    fn receipt_lookup_round_trip() {
        let store = Store::open_tmp();
        let block = sample_block();
        let receipts = sample_receipts(&block);
        store.write_block_body(block.number, &block.hash, &block.transactions);
        store.write_block_receipts(block.number, &block.hash, &receipts);
        store.write_tx_lookup_entries(&block);

        let hash = block.transactions[1].hash();
        let (receipt, _, _, index) = store.receipt(&hash).expect("receipt");
        assert_eq!(receipt, receipts[1]);
        assert_eq!(index, 1);
    }

    #[test]
    fn invalid_exit_receipts_round_trip() {
        let store = Store::open_tmp();
        let block = sample_block();
        let receipts = sample_receipts(&block);
        store.write_block_receipts(block.number, &block.hash, &receipts);
        store.write_invalid_exit_receipts_lookup_entry(
            1,
            block.number,
            &block.hash,
            vec![1, 2],
        );

        let found = store
            .invalid_exit_receipts(1, block.number, &block.hash)
            .expect("invalid exit receipts");
        assert_eq!(found.len(), 2);
        assert_eq!(found[&1], receipts[1]);
        assert_eq!(found[&2], receipts[2]);

        store.delete_invalid_exit_receipts_lookup_entry(1, block.number, &block.hash);
        assert!(store
            .invalid_exit_receipts(1, block.number, &block.hash)
            .is_none());
    }

    #[test]
    fn corrupt_entry_reads_as_missing() {
        let store = Store::open_tmp();
        let hash = B256::ZERO;
        store
            .insert_raw(COLUMN_TX_LOOKUP, hash.as_slice(), &[0xff, 0x00])
            .unwrap();
        assert!(store.tx_lookup_entry(&hash).is_none());
    }

    #[test]
    fn bloom_bits_round_trip() {
        let store = Store::open_tmp();
        let head = B256::ZERO;
        assert!(store.bloom_bits(3, 1, &head).is_none());
        store.write_bloom_bits(3, 1, &head, &[1, 2, 3]);
        assert_eq!(store.bloom_bits(3, 1, &head), Some(vec![1, 2, 3]));
    }

    #[test]
    fn rootchain_cursor_round_trip() {
        let store = Store::open_tmp();
        assert_eq!(store.last_processed_rootchain_block(), None);
        store.set_last_processed_rootchain_block(77);
        assert_eq!(store.last_processed_rootchain_block(), Some(77));
    }

    #[test]
    fn delete_block_drops_indexes() {
        let store = Store::open_tmp();
        let block = sample_block();
        store.write_block_body(block.number, &block.hash, &block.transactions);
        store.write_tx_lookup_entries(&block);
        store.delete_block(&block);
        assert!(store.block_body(block.number, &block.hash).is_none());
        for tx in &block.transactions {
            assert!(store.tx_lookup_entry(&tx.hash()).is_none());
        }
    }
}
