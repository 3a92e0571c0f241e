//! Child-chain transaction receipts.

use alloy_primitives::{keccak256, B256};
use alloy_rlp::{BufMut, Decodable, Encodable, Header};

/// Execution outcome of a child-chain transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReceiptStatus {
    Failed = 0,
    Successful = 1,
}

impl TryFrom<u8> for ReceiptStatus {
    type Error = alloy_rlp::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ReceiptStatus::Failed),
            1 => Ok(ReceiptStatus::Successful),
            _ => Err(alloy_rlp::Error::Custom("unknown receipt status")),
        }
    }
}

/// Receipt of an executed child-chain transaction.
///
/// The canonical encoding is the RLP list `[status, gas_used, tx_hash]`;
/// it is what challenge transactions carry and what the receipts Merkle
/// tree commits to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub status: ReceiptStatus,
    pub gas_used: u64,
    pub tx_hash: B256,
}

impl Receipt {
    pub fn failed(&self) -> bool {
        self.status == ReceiptStatus::Failed
    }

    /// Canonical RLP encoding of the receipt.
    pub fn rlp_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.length());
        self.encode(&mut out);
        out
    }

    /// Keccak hash of the canonical encoding, the leaf of the receipts tree.
    pub fn hash(&self) -> B256 {
        keccak256(self.rlp_bytes())
    }
}

impl Encodable for Receipt {
    fn encode(&self, out: &mut dyn BufMut) {
        let status = self.status as u8;
        let payload_length =
            status.length() + self.gas_used.length() + self.tx_hash.length();
        Header {
            list: true,
            payload_length,
        }
        .encode(out);
        status.encode(out);
        self.gas_used.encode(out);
        self.tx_hash.encode(out);
    }

    fn length(&self) -> usize {
        let status = self.status as u8;
        let payload_length =
            status.length() + self.gas_used.length() + self.tx_hash.length();
        Header {
            list: true,
            payload_length,
        }
        .length()
            + payload_length
    }
}

impl Decodable for Receipt {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(alloy_rlp::Error::UnexpectedString);
        }
        let started_len = buf.len();
        let status = ReceiptStatus::try_from(u8::decode(buf)?)?;
        let gas_used = u64::decode(buf)?;
        let tx_hash = B256::decode(buf)?;
        let consumed = started_len - buf.len();
        if consumed != header.payload_length {
            return Err(alloy_rlp::Error::ListLengthMismatch {
                expected: header.payload_length,
                got: consumed,
            });
        }
        Ok(Receipt {
            status,
            gas_used,
            tx_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    #[test]
    fn receipt_rlp_round_trip() {
        let receipt = Receipt {
            status: ReceiptStatus::Failed,
            gas_used: 21_000,
            tx_hash: b256!("00000000000000000000000000000000000000000000000000000000000000aa"),
        };
        let encoded = receipt.rlp_bytes();
        let decoded = Receipt::decode(&mut encoded.as_slice()).unwrap();
        assert_eq!(decoded, receipt);
    }

    #[test]
    fn rejects_unknown_status() {
        let receipt = Receipt {
            status: ReceiptStatus::Successful,
            gas_used: 1,
            tx_hash: B256::ZERO,
        };
        let mut encoded = receipt.rlp_bytes();
        // Corrupt the status byte. A single-byte status of 1 encodes as
        // itself right after the one-byte list header.
        encoded[1] = 0x05;
        assert!(Receipt::decode(&mut encoded.as_slice()).is_err());
    }
}
