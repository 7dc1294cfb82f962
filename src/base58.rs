//! Base58Check helpers
//!
//! Raw Base58 comes from the `bs58` crate; the 4-byte double-SHA-256 checksum
//! layer goes through [`crate::hashes`] so that checksum failures stay
//! distinguishable from alphabet failures.

use crate::error::{Error, Result};
use crate::hashes;

/// Base58(payload || checksum(payload)).
pub fn check_encode(payload: &[u8]) -> String {
    bs58::encode(payload).with_check().into_string()
}

/// Base58(version || payload || checksum(version || payload)).
pub fn check_encode_versioned(version: u8, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(1 + payload.len());
    data.push(version);
    data.extend_from_slice(payload);
    check_encode(&data)
}

/// Raw Base58 decode, checksum not interpreted.
pub fn decode(s: &str) -> Result<Vec<u8>> {
    Ok(bs58::decode(s).into_vec()?)
}

/// Base58Check decode: verifies and strips the trailing 4-byte checksum.
pub fn check_decode(s: &str) -> Result<Vec<u8>> {
    let mut data = decode(s)?;
    if data.len() < 5 {
        return Err(Error::Format(format!(
            "base58check payload too short: {} bytes",
            data.len()
        )));
    }
    if !hashes::verify_checksum(&data) {
        return Err(Error::Checksum);
    }
    data.truncate(data.len() - 4);
    Ok(data)
}
