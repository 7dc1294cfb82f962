//! BIP38 password-protected private key encryption
//!
//! Non-EC-multiply mode only: an existing WIF key is encrypted under a
//! passphrase with scrypt-derived key material and AES-256-ECB, committed to
//! its P2PKH address through a 4-byte salt.
//!
//! Format of the 39-byte body, Base58Check-wrapped to 43 bytes:
//! `0x01 0x42 | flag | salt(4) | encrypted_half1(16) | encrypted_half2(16)`
//! where the flag is 0xE0 for compressed keys and 0xC0 otherwise.
//!
//! The EC-multiply mode (prefix 0x0143) is rejected with a typed error.

use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes256;
use secp256k1::{Secp256k1, SecretKey};

use crate::base58;
use crate::error::{Error, Result};
use crate::hashes;
use crate::key::PrivateKey;
use crate::network::{CoinType, Network};

const PREFIX_NON_EC: [u8; 2] = [0x01, 0x42];
const PREFIX_EC: [u8; 2] = [0x01, 0x43];
const FLAG_COMPRESSED: u8 = 0xe0;
const FLAG_UNCOMPRESSED: u8 = 0xc0;
const FLAG_COMPRESSION_BIT: u8 = 0x20;

// Scrypt cost parameters fixed by the format: N = 16384, r = 8, p = 8
const SCRYPT_LOG_N: u8 = 14;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 8;
const SCRYPT_KEY_LEN: usize = 64;

const BODY_LEN: usize = 39;

/// Encrypt a WIF private key under a passphrase.
///
/// Coin, network and compression state are read from the WIF string itself.
/// The scrypt derivation makes this an intentionally slow call.
pub fn encrypt(wif: &str, passphrase: &str) -> Result<String> {
    let key = PrivateKey::from_wif(wif)?;
    let secp = Secp256k1::new();
    let address = key.p2pkh_address(&secp);

    let address_hash = hashes::sha256d(address.as_bytes());
    let salt = &address_hash[..4];

    let derived = derive_key(passphrase, salt)?;
    let (half1, half2) = derived.split_at(32);

    let secret = key.inner.secret_bytes();
    let block1 = hashes::xor(&secret[..16], &half1[..16])?;
    let block2 = hashes::xor(&secret[16..], &half1[16..])?;
    let encrypted1 = aes256_encrypt(&block1, half2);
    let encrypted2 = aes256_encrypt(&block2, half2);

    let mut body = Vec::with_capacity(BODY_LEN);
    body.extend_from_slice(&PREFIX_NON_EC);
    body.push(if key.compressed {
        FLAG_COMPRESSED
    } else {
        FLAG_UNCOMPRESSED
    });
    body.extend_from_slice(salt);
    body.extend_from_slice(&encrypted1);
    body.extend_from_slice(&encrypted2);

    Ok(base58::check_encode(&body))
}

/// Decrypt a BIP38 string back to the WIF key it was built from.
///
/// The only integrity signal is the address recomputation: the P2PKH address
/// of the recovered key, rendered for `(coin, network)`, must hash back to
/// the embedded salt. A wrong passphrase therefore fails with
/// [`Error::WrongPassphrase`] instead of yielding a plausible wrong key.
pub fn decrypt(
    encoded: &str,
    passphrase: &str,
    coin: CoinType,
    network: Network,
) -> Result<String> {
    let body = base58::check_decode(encoded)?;
    if body.len() != BODY_LEN {
        return Err(Error::Format(format!(
            "encrypted key body must be {} bytes, got {}",
            BODY_LEN,
            body.len()
        )));
    }
    if body[..2] == PREFIX_EC {
        return Err(Error::UnsupportedKeyFormat(
            "EC-multiply mode (0x0143) is not supported".into(),
        ));
    }
    if body[..2] != PREFIX_NON_EC {
        return Err(Error::Format("unrecognized encrypted key prefix".into()));
    }

    let compressed = body[2] & FLAG_COMPRESSION_BIT != 0;
    let salt = &body[3..7];

    let derived = derive_key(passphrase, salt)?;
    let (half1, half2) = derived.split_at(32);

    let decrypted1 = aes256_decrypt(&body[7..23], half2);
    let decrypted2 = aes256_decrypt(&body[23..39], half2);

    let mut secret = [0u8; 32];
    secret[..16].copy_from_slice(&hashes::xor(&decrypted1, &half1[..16])?);
    secret[16..].copy_from_slice(&hashes::xor(&decrypted2, &half1[16..])?);

    // A wrong passphrase decrypts to noise; an out-of-range scalar is the
    // same signal as a failed address check.
    let inner = SecretKey::from_slice(&secret).map_err(|_| Error::WrongPassphrase)?;
    let key = PrivateKey::new(inner, compressed, coin, network);

    let secp = Secp256k1::new();
    let address = key.p2pkh_address(&secp);
    if hashes::sha256d(address.as_bytes())[..4] != *salt {
        return Err(Error::WrongPassphrase);
    }

    Ok(key.to_wif())
}

/// The 64-byte scrypt derivation both directions share.
fn derive_key(passphrase: &str, salt: &[u8]) -> Result<[u8; SCRYPT_KEY_LEN]> {
    let params = scrypt::Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, SCRYPT_KEY_LEN)
        .map_err(|_| Error::Digest)?;
    let mut derived = [0u8; SCRYPT_KEY_LEN];
    scrypt::scrypt(passphrase.as_bytes(), salt, &params, &mut derived)
        .map_err(|_| Error::Digest)?;
    Ok(derived)
}

/// AES-256-ECB over a single 16-byte block, no padding.
fn aes256_encrypt(block: &[u8], key: &[u8]) -> [u8; 16] {
    let cipher = Aes256::new(GenericArray::from_slice(key));
    let mut buf = GenericArray::clone_from_slice(block);
    cipher.encrypt_block(&mut buf);
    let mut out = [0u8; 16];
    out.copy_from_slice(&buf);
    out
}

fn aes256_decrypt(block: &[u8], key: &[u8]) -> [u8; 16] {
    let cipher = Aes256::new(GenericArray::from_slice(key));
    let mut buf = GenericArray::clone_from_slice(block);
    cipher.decrypt_block(&mut buf);
    let mut out = [0u8; 16];
    out.copy_from_slice(&buf);
    out
}
