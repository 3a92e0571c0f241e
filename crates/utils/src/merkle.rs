//! Binary Merkle tree over receipt encodings.
//!
//! Leaves are the keccak hashes of the canonical receipt encodings, padded
//! with zero hashes to a power of two. Inclusion proofs are the sibling
//! hashes from leaf to root; the leaf index decides hashing order during
//! verification.

use alloy_primitives::{keccak256, B256};
use plasma_types::receipt::Receipt;

fn hash_pair(left: &B256, right: &B256) -> B256 {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(left.as_slice());
    buf[32..].copy_from_slice(right.as_slice());
    keccak256(buf)
}

fn padded(leaves: &[B256]) -> Vec<B256> {
    let mut level = leaves.to_vec();
    let width = leaves.len().next_power_of_two().max(1);
    level.resize(width, B256::ZERO);
    level
}

pub fn merkle_root(leaves: &[B256]) -> B256 {
    if leaves.is_empty() {
        return B256::ZERO;
    }
    let mut level = padded(leaves);
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| hash_pair(&pair[0], &pair[1]))
            .collect();
    }
    level[0]
}

/// Sibling hashes proving inclusion of `leaves[index]`.
pub fn merkle_proof(leaves: &[B256], index: usize) -> Vec<B256> {
    assert!(index < leaves.len(), "proof index out of range");
    let mut level = padded(leaves);
    let mut index = index;
    let mut proof = Vec::new();
    while level.len() > 1 {
        proof.push(level[index ^ 1]);
        level = level
            .chunks(2)
            .map(|pair| hash_pair(&pair[0], &pair[1]))
            .collect();
        index /= 2;
    }
    proof
}

pub fn verify_proof(root: B256, leaf: B256, index: usize, proof: &[B256]) -> bool {
    let mut acc = leaf;
    let mut index = index;
    for sibling in proof {
        acc = if index % 2 == 0 {
            hash_pair(&acc, sibling)
        } else {
            hash_pair(sibling, &acc)
        };
        index /= 2;
    }
    index == 0 && acc == root
}

pub fn receipt_leaves(receipts: &[Receipt]) -> Vec<B256> {
    receipts.iter().map(Receipt::hash).collect()
}

pub fn receipts_root(receipts: &[Receipt]) -> B256 {
    merkle_root(&receipt_leaves(receipts))
}

/// Inclusion proof of the receipt at `index` within `receipts`.
pub fn receipts_proof(receipts: &[Receipt], index: usize) -> Vec<B256> {
    merkle_proof(&receipt_leaves(receipts), index)
}
