//! Child-chain and root-chain transactions.
//!
//! Both chains speak the same legacy transaction format: the RLP list
//! `[nonce, gas_price, gas, to, value, input, v, r, s]`. An unsigned
//! transaction carries a zero signature; that form is also the canonical
//! request-transaction encoding the root chain returns from `GetEROBytes`.

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_rlp::{BufMut, Decodable, Encodable, Header, EMPTY_STRING_CODE};

/// A legacy transaction, unsigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas: u64,
    /// `None` creates a contract.
    pub to: Option<Address>,
    pub value: U256,
    pub input: Bytes,
}

/// A recoverable secp256k1 signature in transaction form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub v: u64,
    pub r: U256,
    pub s: U256,
}

/// A signed transaction ready for dispatch, plus its hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub raw: Bytes,
    pub hash: B256,
}

impl Transaction {
    fn encode_to_field(&self, out: &mut dyn BufMut) {
        match self.to {
            Some(address) => address.encode(out),
            None => out.put_u8(EMPTY_STRING_CODE),
        }
    }

    fn to_field_length(&self) -> usize {
        match self.to {
            Some(address) => address.length(),
            None => 1,
        }
    }

    fn base_payload_length(&self) -> usize {
        self.nonce.length()
            + self.gas_price.length()
            + self.gas.length()
            + self.to_field_length()
            + self.value.length()
            + self.input.length()
    }

    fn encode_base_fields(&self, out: &mut dyn BufMut) {
        self.nonce.encode(out);
        self.gas_price.encode(out);
        self.gas.encode(out);
        self.encode_to_field(out);
        self.value.encode(out);
        self.input.encode(out);
    }

    fn encode_with_signature(&self, v: u64, r: U256, s: U256) -> Vec<u8> {
        let payload_length =
            self.base_payload_length() + v.length() + r.length() + s.length();
        let header = Header {
            list: true,
            payload_length,
        };
        let mut out = Vec::with_capacity(header.length() + payload_length);
        header.encode(&mut out);
        self.encode_base_fields(&mut out);
        v.encode(&mut out);
        r.encode(&mut out);
        s.encode(&mut out);
        out
    }

    /// Canonical encoding: the full transaction list with a zero signature.
    pub fn rlp_bytes(&self) -> Vec<u8> {
        self.encode_with_signature(0, U256::ZERO, U256::ZERO)
    }

    /// Hash of the canonical encoding. Identifies unsigned request
    /// transactions in child blocks.
    pub fn hash(&self) -> B256 {
        keccak256(self.rlp_bytes())
    }

    /// The message an operator signs for the given network id.
    pub fn sighash(&self, chain_id: u64) -> B256 {
        keccak256(self.encode_with_signature(chain_id, U256::ZERO, U256::ZERO))
    }

    /// Seal the transaction with a signature whose `v` already encodes the
    /// network id.
    pub fn into_signed(self, signature: Signature) -> SignedTransaction {
        let raw = self.encode_with_signature(signature.v, signature.r, signature.s);
        let hash = keccak256(&raw);
        SignedTransaction {
            raw: raw.into(),
            hash,
        }
    }
}

impl Encodable for Transaction {
    fn encode(&self, out: &mut dyn BufMut) {
        let payload_length = self.base_payload_length() + 3;
        Header {
            list: true,
            payload_length,
        }
        .encode(out);
        self.encode_base_fields(out);
        // zero signature, one byte each
        0u64.encode(out);
        U256::ZERO.encode(out);
        U256::ZERO.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.base_payload_length() + 3;
        Header {
            list: true,
            payload_length,
        }
        .length()
            + payload_length
    }
}

impl Decodable for Transaction {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(alloy_rlp::Error::UnexpectedString);
        }
        let started_len = buf.len();
        let nonce = u64::decode(buf)?;
        let gas_price = U256::decode(buf)?;
        let gas = u64::decode(buf)?;
        let to = if buf.first() == Some(&EMPTY_STRING_CODE) {
            *buf = &buf[1..];
            None
        } else {
            Some(Address::decode(buf)?)
        };
        let value = U256::decode(buf)?;
        let input = Bytes::decode(buf)?;
        // the canonical form carries a zero signature; drop it
        let _ = u64::decode(buf)?;
        let _ = U256::decode(buf)?;
        let _ = U256::decode(buf)?;
        let consumed = started_len - buf.len();
        if consumed != header.payload_length {
            return Err(alloy_rlp::Error::ListLengthMismatch {
                expected: header.payload_length,
                got: consumed,
            });
        }
        Ok(Transaction {
            nonce,
            gas_price,
            gas,
            to,
            value,
            input,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    fn sample_tx() -> Transaction {
        Transaction {
            nonce: 7,
            gas_price: U256::from(1_000_000_000u64),
            gas: 100_000,
            to: Some(address!("00000000000000000000000000000000000000aa")),
            value: U256::from(10u64),
            input: Bytes::from_static(&[0xca, 0xfe]),
        }
    }

    #[test]
    fn canonical_encoding_is_stable() {
        let tx = sample_tx();
        assert_eq!(tx.rlp_bytes(), tx.rlp_bytes());
        assert_eq!(tx.hash(), tx.hash());
    }

    #[test]
    fn canonical_encoding_round_trips() {
        for tx in [
            sample_tx(),
            Transaction {
                to: None,
                ..sample_tx()
            },
        ] {
            let encoded = tx.rlp_bytes();
            let decoded = Transaction::decode(&mut encoded.as_slice()).unwrap();
            assert_eq!(decoded, tx);
        }
    }

    #[test]
    fn trait_encoding_matches_canonical() {
        let tx = sample_tx();
        let mut encoded = Vec::new();
        tx.encode(&mut encoded);
        assert_eq!(encoded, tx.rlp_bytes());
        assert_eq!(Encodable::length(&tx), encoded.len());
    }

    #[test]
    fn sighash_commits_to_network_id() {
        let tx = sample_tx();
        assert_ne!(tx.sighash(1337), tx.sighash(1));
        // The canonical form is the zero-network sighash input.
        assert_eq!(tx.sighash(0), keccak256(tx.rlp_bytes()));
    }

    #[test]
    fn signed_encoding_differs_from_canonical() {
        let tx = sample_tx();
        let canonical = tx.rlp_bytes();
        let signed = tx.into_signed(Signature {
            v: 2709,
            r: U256::from(1u64),
            s: U256::from(2u64),
        });
        assert_ne!(canonical, signed.raw.to_vec());
        assert_eq!(signed.hash, keccak256(signed.raw.clone()));
    }
}
