//! Cryptographic operations for Bitcoin key and address derivation.
//!
//! This module provides:
//! - HASH160 fingerprints of compressed secp256k1 public keys
//! - P2PKH address encoding and decoding
//! - WIF encoding of found private keys

mod address;
mod deriver;
mod wif;

pub use address::{AddressError, Fingerprint};
pub use deriver::{secret_key_bytes, AddressDeriver, DeriveError, Hash160Deriver};
pub use wif::encode_wif;
