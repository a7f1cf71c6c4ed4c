//! WIF (Wallet Import Format) encoding.

/// Mainnet private key version byte.
const WIF_VERSION: u8 = 0x80;
/// Suffix marking the key as belonging to a compressed public key.
const COMPRESSED_FLAG: u8 = 0x01;

/// Encodes a secret key as a mainnet, compressed-pubkey WIF string.
pub fn encode_wif(secret: &[u8; 32]) -> String {
    let mut payload = [0u8; 34];
    payload[0] = WIF_VERSION;
    payload[1..33].copy_from_slice(secret);
    payload[33] = COMPRESSED_FLAG;
    bs58::encode(payload).with_check().into_string()
}
