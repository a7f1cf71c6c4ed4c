//! Candidate key to fingerprint derivation.

use num_bigint::BigUint;
use ripemd::Ripemd160;
use secp256k1::{PublicKey, Secp256k1, SecretKey, SignOnly};
use sha2::{Digest, Sha256};

use super::Fingerprint;

/// Maps a candidate private key to its address fingerprint.
///
/// Implementations must be deterministic and free of side effects: the
/// search engine may call `derive` from any worker thread, and a failure is
/// treated as fatal to the run rather than skipped.
pub trait AddressDeriver: Send + Sync {
    fn derive(&self, candidate: &BigUint) -> Result<Fingerprint, DeriveError>;
}

/// Derives the HASH160 of the compressed secp256k1 public key, which is the
/// payload of a P2PKH address.
pub struct Hash160Deriver {
    secp: Secp256k1<SignOnly>,
}

impl Hash160Deriver {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::signing_only(),
        }
    }

    /// Hashes a serialized public key: RIPEMD160(SHA256(data)).
    #[inline]
    fn hash160(data: &[u8]) -> Fingerprint {
        let sha = Sha256::digest(data);
        let ripemd = Ripemd160::digest(sha);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&ripemd);
        Fingerprint::from_bytes(bytes)
    }
}

impl Default for Hash160Deriver {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressDeriver for Hash160Deriver {
    fn derive(&self, candidate: &BigUint) -> Result<Fingerprint, DeriveError> {
        let bytes = secret_key_bytes(candidate)?;
        let secret = SecretKey::from_slice(&bytes)
            .map_err(|_| DeriveError::InvalidScalar(candidate.clone()))?;
        let public = PublicKey::from_secret_key(&self.secp, &secret);
        Ok(Self::hash160(&public.serialize()))
    }
}

/// Left-pads a candidate into a 32-byte big-endian secret key.
pub fn secret_key_bytes(candidate: &BigUint) -> Result<[u8; 32], DeriveError> {
    let raw = candidate.to_bytes_be();
    if raw.len() > 32 {
        return Err(DeriveError::TooLarge(candidate.clone()));
    }
    let mut bytes = [0u8; 32];
    bytes[32 - raw.len()..].copy_from_slice(&raw);
    Ok(bytes)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeriveError {
    #[error("candidate {0:#x} does not fit in 256 bits")]
    TooLarge(BigUint),
    #[error("candidate {0:#x} is not a valid secp256k1 secret key")]
    InvalidScalar(BigUint),
}

impl DeriveError {
    /// Returns the candidate that could not be derived.
    pub fn candidate(&self) -> &BigUint {
        match self {
            DeriveError::TooLarge(c) | DeriveError::InvalidScalar(c) => c,
        }
    }
}
