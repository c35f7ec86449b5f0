//! Signature verification for price updates
//!
//! The oracle only needs "which address signed this digest". That question is
//! behind [`Verifier`] so the handlers can be exercised with a stub; the
//! production implementation recovers a secp256k1 key and derives the
//! Ethereum-style address from it.

use keel_common::{Address, LedgerError, Signature, Symbol};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey, VerifyOnly};
use sha3::{Digest, Keccak256};

/// Recover the signer of a 32-byte digest
pub trait Verifier {
    fn recover(&self, digest: &[u8; 32], signature: &Signature) -> Result<Address, LedgerError>;
}

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

fn u256_be(value: u128) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[16..].copy_from_slice(&value.to_be_bytes());
    out
}

/// Digest a signer commits to for one price update
pub fn price_digest(nonce: u64, price: u128, symbol: &Symbol) -> [u8; 32] {
    let mut packed = Vec::with_capacity(64 + symbol.as_bytes().len());
    packed.extend_from_slice(&u256_be(nonce as u128));
    packed.extend_from_slice(&u256_be(price));
    packed.extend_from_slice(symbol.as_bytes());
    let digest = keccak256(&packed);

    let mut prefixed = Vec::with_capacity(28 + 32);
    prefixed.extend_from_slice(b"\x19Ethereum Signed Message:\n32");
    prefixed.extend_from_slice(&digest);
    keccak256(&prefixed)
}

/// Address = last 20 bytes of keccak256(uncompressed pubkey without prefix)
pub fn address_from_public_key(key: &PublicKey) -> Address {
    let uncompressed = key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&hash[12..]);
    Address(out)
}

/// secp256k1 public-key recovery
pub struct Secp256k1Verifier {
    secp: Secp256k1<VerifyOnly>,
}

impl Secp256k1Verifier {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::verification_only(),
        }
    }
}

impl Default for Secp256k1Verifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Verifier for Secp256k1Verifier {
    fn recover(&self, digest: &[u8; 32], signature: &Signature) -> Result<Address, LedgerError> {
        let recovery_id = RecoveryId::from_i32(signature.recovery_id() as i32)
            .map_err(|_| LedgerError::BadSignature)?;
        let recoverable = RecoverableSignature::from_compact(&signature.compact(), recovery_id)
            .map_err(|_| LedgerError::BadSignature)?;
        let message = Message::from_digest(*digest);
        let key = self
            .secp
            .recover_ecdsa(&message, &recoverable)
            .map_err(|_| LedgerError::BadSignature)?;
        Ok(address_from_public_key(&key))
    }
}

/// Holder of a price-feed signing key
///
/// Used by feeders (and the keeper's devnet simulation) to produce updates the
/// oracle accepts.
pub struct PriceSigner {
    secp: Secp256k1<All>,
    key: SecretKey,
}

impl PriceSigner {
    pub fn from_bytes(secret: &[u8]) -> Result<Self, LedgerError> {
        let key = SecretKey::from_slice(secret).map_err(|_| LedgerError::BadSignature)?;
        Ok(Self {
            secp: Secp256k1::new(),
            key,
        })
    }

    pub fn address(&self) -> Address {
        address_from_public_key(&PublicKey::from_secret_key(&self.secp, &self.key))
    }

    pub fn sign_digest(&self, digest: &[u8; 32]) -> Signature {
        let message = Message::from_digest(*digest);
        let (recovery_id, compact) = self
            .secp
            .sign_ecdsa_recoverable(&message, &self.key)
            .serialize_compact();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&compact[..32]);
        s.copy_from_slice(&compact[32..]);
        Signature {
            v: 27 + recovery_id.to_i32() as u8,
            r,
            s,
        }
    }

    pub fn sign_price(&self, nonce: u64, price: u128, symbol: &Symbol) -> Signature {
        self.sign_digest(&price_digest(nonce, price, symbol))
    }
}
