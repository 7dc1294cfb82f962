//! Digest and checksum utilities
//!
//! Thin wrappers over the SHA-256 / SHA-512 / RIPEMD-160 primitives: the
//! double-SHA-256 checksum used by every Base58Check layer, HMAC-SHA512 for
//! BIP32 derivation, and HASH160 for fingerprints and addresses.

use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};

use crate::error::{Error, Result};

type HmacSha512 = Hmac<Sha512>;

/// SHA-256 of the input.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Double SHA-256 of the input.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// First 4 bytes of the double SHA-256 of the input.
pub fn checksum(data: &[u8]) -> [u8; 4] {
    let digest = sha256d(data);
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

/// True iff the last 4 bytes of `data` are the checksum of everything before
/// them. Buffers too short to carry a checksum verify as false.
pub fn verify_checksum(data: &[u8]) -> bool {
    if data.len() < 5 {
        return false;
    }
    let (payload, check) = data.split_at(data.len() - 4);
    checksum(payload) == check
}

/// RIPEMD160(SHA256(data)), the 20-byte key hash.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let digest = Ripemd160::digest(sha256(data));
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest);
    out
}

/// HMAC-SHA512 of `data` under `key`. Never returns a partial result; a MAC
/// that cannot be keyed is a `Digest` error.
pub fn hmac_sha512(data: &[u8], key: &[u8]) -> Result<[u8; 64]> {
    let mut mac = HmacSha512::new_from_slice(key)?;
    mac.update(data);
    let digest = mac.finalize().into_bytes();
    let mut out = [0u8; 64];
    out.copy_from_slice(&digest);
    Ok(out)
}

/// Byte-wise XOR of two equal-length slices.
pub fn xor(a: &[u8], b: &[u8]) -> Result<Vec<u8>> {
    if a.len() != b.len() {
        return Err(Error::InvalidArgument(format!(
            "xor operands differ in length: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    Ok(a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_vector() {
        // FIPS 180-2 "abc" vector
        let digest = sha256(b"abc");
        assert_eq!(
            hex::encode(digest),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_checksum_is_sha256d_prefix() {
        let data = b"coin-keys";
        let digest = sha256d(data);
        assert_eq!(checksum(data), digest[..4]);
    }

    #[test]
    fn test_verify_checksum() {
        let mut buf = b"payload".to_vec();
        let check = checksum(&buf);
        buf.extend_from_slice(&check);
        assert!(verify_checksum(&buf));

        buf[0] ^= 0x01;
        assert!(!verify_checksum(&buf));

        assert!(!verify_checksum(&[]));
        assert!(!verify_checksum(&[0u8; 4]));
    }

    #[test]
    fn test_hmac_sha512_rfc4231_case1() {
        let key = [0x0bu8; 20];
        let out = hmac_sha512(b"Hi There", &key).unwrap();
        assert_eq!(
            hex::encode(out),
            "87aa7cdea5ef619d4ff0b4241a1d6cb02379f4e2ce4ec2787ad0b30545e17cde\
             daa833b7d6b8a702038b274eaea3f4e4be9d914eeb61f1702e696c203a126854"
        );
    }

    #[test]
    fn test_xor() {
        assert_eq!(xor(&[0xff, 0x0f], &[0x0f, 0xff]).unwrap(), vec![0xf0, 0xf0]);
        assert!(matches!(xor(&[1, 2], &[1]), Err(Error::InvalidArgument(_))));
    }
}
