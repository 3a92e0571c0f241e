use anyhow::{anyhow, Context, Result};
use faster_hex::hex_decode;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};
use sha3::{Digest, Keccak256};

use alloy_primitives::{Address, B256, U256};
use plasma_config::WalletConfig;
use plasma_types::transaction::{Signature, SignedTransaction, Transaction};

/// The operator identity: a secp256k1 key and the account derived from it.
pub struct Wallet {
    secp: Secp256k1<All>,
    privkey: SecretKey,
    address: Address,
}

impl Wallet {
    pub fn new(privkey: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let address = pubkey_to_address(&PublicKey::from_secret_key(&secp, &privkey));
        Wallet {
            secp,
            privkey,
            address,
        }
    }

    pub fn from_config(config: &WalletConfig) -> Result<Self> {
        let privkey = {
            let content = std::fs::read_to_string(&config.privkey_path)
                .with_context(|| "read wallet privkey")?;
            let content = content.trim_start_matches("0x").trim();
            if content.as_bytes().len() != 64 {
                return Err(anyhow!("invalid privkey length"));
            }
            let mut decoded = [0u8; 32];
            hex_decode(content.as_bytes(), &mut decoded)?;
            SecretKey::from_slice(&decoded)?
        };
        Ok(Self::new(privkey))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte digest, returning the recovery id and compact bytes.
    pub fn sign_message(&self, msg: B256) -> Result<(RecoveryId, [u8; 64])> {
        let msg = Message::from_digest_slice(msg.as_slice())
            .map_err(|err| anyhow!("signing error: {}", err))?;
        let signature = self.secp.sign_ecdsa_recoverable(&msg, &self.privkey);
        Ok(signature.serialize_compact())
    }

    /// Seal a transaction with a replay-protected signature for the given
    /// network id.
    pub fn sign_transaction(
        &self,
        tx: Transaction,
        network_id: u64,
    ) -> Result<SignedTransaction> {
        let (recovery_id, compact) = self.sign_message(tx.sighash(network_id))?;
        let signature = Signature {
            v: network_id * 2 + 35 + recovery_id.to_i32() as u64,
            r: U256::from_be_slice(&compact[..32]),
            s: U256::from_be_slice(&compact[32..]),
        };
        Ok(tx.into_signed(signature))
    }

    /// Recover the signing account of a message signed by [`sign_message`].
    pub fn recover(&self, msg: B256, recovery_id: RecoveryId, compact: &[u8; 64]) -> Result<Address> {
        let msg = Message::from_digest_slice(msg.as_slice())
            .map_err(|err| anyhow!("recover error: {}", err))?;
        let signature = RecoverableSignature::from_compact(compact, recovery_id)?;
        let pubkey = self.secp.recover_ecdsa(&msg, &signature)?;
        Ok(pubkey_to_address(&pubkey))
    }
}

pub fn pubkey_to_address(pubkey: &PublicKey) -> Address {
    let digest = {
        let mut hasher = Keccak256::new();
        hasher.update(&pubkey.serialize_uncompressed()[1..]);
        hasher.finalize()
    };
    Address::from_slice(&digest[12..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Bytes, B256};

    fn test_wallet() -> Wallet {
        let privkey = SecretKey::from_slice(&[0x11u8; 32]).unwrap();
        Wallet::new(privkey)
    }

    #[test]
    fn signature_recovers_to_wallet_address() {
        let wallet = test_wallet();
        let digest = B256::repeat_byte(0xab);
        let (recovery_id, compact) = wallet.sign_message(digest).unwrap();
        let recovered = wallet.recover(digest, recovery_id, &compact).unwrap();
        assert_eq!(recovered, wallet.address());
    }

    #[test]
    fn transaction_signature_encodes_network_id() {
        let wallet = test_wallet();
        let tx = Transaction {
            nonce: 1,
            gas_price: U256::from(1u64),
            gas: 21_000,
            to: Some(Address::ZERO),
            value: U256::ZERO,
            input: Bytes::new(),
        };
        let network_id = 1337;
        let signed = wallet.sign_transaction(tx.clone(), network_id).unwrap();
        assert_ne!(signed.raw.to_vec(), tx.rlp_bytes());
        // v = network_id * 2 + 35 + {0, 1}
        let sighash = tx.sighash(network_id);
        let (recovery_id, _) = wallet.sign_message(sighash).unwrap();
        assert!(recovery_id.to_i32() == 0 || recovery_id.to_i32() == 1);
    }

    #[test]
    fn rejects_malformed_privkey_file() {
        let dir = std::env::temp_dir().join("plasma-wallet-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("privkey");
        std::fs::write(&path, "0xzz").unwrap();
        let config = WalletConfig {
            privkey_path: path,
            operator: Address::ZERO,
        };
        assert!(Wallet::from_config(&config).is_err());
    }
}
