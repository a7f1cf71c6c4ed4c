//! Bitcoin P2PKH fingerprint representation and utilities.

use std::fmt;
use std::str::FromStr;

/// Version byte of mainnet P2PKH addresses.
const P2PKH_VERSION: u8 = 0x00;

/// A HASH160 public-key fingerprint (20 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 20]);

impl Fingerprint {
    /// Creates a fingerprint from raw bytes.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Returns the fingerprint as raw bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns the fingerprint as a lowercase hex string.
    #[inline]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns the base58check P2PKH address for this fingerprint.
    pub fn to_address(&self) -> String {
        let mut payload = [0u8; 21];
        payload[0] = P2PKH_VERSION;
        payload[1..].copy_from_slice(&self.0);
        bs58::encode(payload).with_check().into_string()
    }

    /// Decodes a base58check P2PKH address.
    pub fn from_address(address: &str) -> Result<Self, AddressError> {
        let decoded = bs58::decode(address)
            .with_check(Some(P2PKH_VERSION))
            .into_vec()
            .map_err(|e| AddressError::Base58(e.to_string()))?;

        // Version byte followed by the 20-byte hash.
        if decoded.len() != 21 {
            return Err(AddressError::Length(decoded.len().saturating_sub(1)));
        }

        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&decoded[1..]);
        Ok(Self(bytes))
    }

    /// Decodes a 40-character hex fingerprint.
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let decoded = hex::decode(s).map_err(|e| AddressError::Hex(e.to_string()))?;
        let bytes: [u8; 20] = decoded
            .try_into()
            .map_err(|v: Vec<u8>| AddressError::Length(v.len()))?;
        Ok(Self(bytes))
    }
}

impl FromStr for Fingerprint {
    type Err = AddressError;

    /// Accepts either a P2PKH address or a raw hex fingerprint.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        if s.len() == 40 || s.starts_with("0x") {
            Self::from_hex(s)
        } else {
            Self::from_address(s)
        }
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_address())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("Empty address")]
    Empty,
    #[error("Invalid base58check address: {0}")]
    Base58(String),
    #[error("Invalid hex fingerprint: {0}")]
    Hex(String),
    #[error("Fingerprint must be 20 bytes, got {0}")]
    Length(usize),
}
