//! WIF private keys and P2PKH addresses
//!
//! A private key tagged with its compression state and home network, parsed
//! from and rendered to the Base58Check WIF format. The network tag comes out
//! of the WIF header byte through the registry, so a key string carries
//! everything needed to rebuild its address.

use core::fmt;
use core::str::FromStr;

use secp256k1::{PublicKey, Secp256k1, SecretKey, Signing};

use crate::base58;
use crate::error::{Error, Result};
use crate::hashes;
use crate::network::{self, CoinType, Network};

/// Marker byte appended to the scalar in compressed-key WIF strings
const WIF_COMPRESSED_MARKER: u8 = 0x01;

/// A private key with its WIF metadata
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PrivateKey {
    /// Whether the corresponding public key is serialized compressed
    pub compressed: bool,
    /// Coin the WIF header committed to
    pub coin: CoinType,
    /// Network the WIF header committed to
    pub network: Network,
    /// The underlying scalar
    pub inner: SecretKey,
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("compressed", &self.compressed)
            .field("coin", &self.coin)
            .field("network", &self.network)
            .field("inner", &"<hidden>")
            .finish()
    }
}

impl PrivateKey {
    /// Wrap a raw scalar.
    pub fn new(inner: SecretKey, compressed: bool, coin: CoinType, network: Network) -> Self {
        PrivateKey {
            compressed,
            coin,
            network,
            inner,
        }
    }

    /// Parse a WIF string: header(1) | scalar(32) | [0x01] | checksum(4).
    pub fn from_wif(wif: &str) -> Result<PrivateKey> {
        let data = base58::decode(wif)?;
        if !hashes::verify_checksum(&data) {
            return Err(Error::Checksum);
        }

        let compressed = match data.len() {
            38 if data[33] == WIF_COMPRESSED_MARKER => true,
            37 => false,
            _ => {
                return Err(Error::UnsupportedKeyFormat(
                    "WIF key material is not 32 or 33 bytes".into(),
                ))
            }
        };

        let info = network::info_from_header(data[0])?;
        Ok(PrivateKey {
            compressed,
            coin: info.coin,
            network: info.network,
            inner: SecretKey::from_slice(&data[1..33])?,
        })
    }

    /// Render the WIF string for this key's network.
    pub fn to_wif(&self) -> String {
        let info = network::network_info(self.coin, self.network);
        let mut payload = Vec::with_capacity(33);
        payload.extend_from_slice(&self.inner.secret_bytes());
        if self.compressed {
            payload.push(WIF_COMPRESSED_MARKER);
        }
        base58::check_encode_versioned(info.wif_header, &payload)
    }

    /// The corresponding public key.
    pub fn public_key<C: Signing>(&self, secp: &Secp256k1<C>) -> PublicKey {
        PublicKey::from_secret_key(secp, &self.inner)
    }

    /// The P2PKH address string, honoring the compression flag.
    pub fn p2pkh_address<C: Signing>(&self, secp: &Secp256k1<C>) -> String {
        let pubkey = self.public_key(secp);
        let hash = if self.compressed {
            hashes::hash160(&pubkey.serialize())
        } else {
            hashes::hash160(&pubkey.serialize_uncompressed())
        };
        let info = network::network_info(self.coin, self.network);
        base58::check_encode_versioned(info.pubkey_hash_header, &hash)
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wif())
    }
}

impl FromStr for PrivateKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PrivateKey::from_wif(s)
    }
}

/// P2PKH address for an already-serialized public key (compressed or not).
pub fn p2pkh_address(pubkey: &[u8], coin: CoinType, network: Network) -> Result<String> {
    if pubkey.len() != 33 && pubkey.len() != 65 {
        return Err(Error::InvalidArgument(format!(
            "public key must be 33 or 65 bytes, got {}",
            pubkey.len()
        )));
    }
    let info = network::network_info(coin, network);
    Ok(base58::check_encode_versioned(
        info.pubkey_hash_header,
        &hashes::hash160(pubkey),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    // The textbook uncompressed/compressed WIF pair for the same scalar
    const SECRET_HEX: &str = "0c28fca386c7a227600b2fe50b7cae11ec86d3bf1fbe471be89827e19d72aa1d";
    const WIF_UNCOMPRESSED: &str = "5HueCGU8rMjxEXxiPuD5BDku4MkFqeZyd4dZ1jvhTVqvbTLvyTJ";
    const WIF_COMPRESSED: &str = "KwdMAjGmerYanjeui5SHS7JkmpZvVipYvB2LJGU1ZxJwYvP98617";

    #[test]
    fn test_from_wif_uncompressed() {
        let key = PrivateKey::from_wif(WIF_UNCOMPRESSED).unwrap();
        assert!(!key.compressed);
        assert_eq!(key.coin, CoinType::Bitcoin);
        assert_eq!(key.network, Network::Mainnet);
        assert_eq!(hex::encode(key.inner.secret_bytes()), SECRET_HEX);
        assert_eq!(key.to_wif(), WIF_UNCOMPRESSED);
    }

    #[test]
    fn test_from_wif_compressed() {
        let key = PrivateKey::from_wif(WIF_COMPRESSED).unwrap();
        assert!(key.compressed);
        assert_eq!(hex::encode(key.inner.secret_bytes()), SECRET_HEX);
        assert_eq!(key.to_wif(), WIF_COMPRESSED);
    }

    #[test]
    fn test_wif_bad_checksum() {
        let mut wif = WIF_UNCOMPRESSED.to_string();
        wif.pop();
        wif.push('x');
        assert_eq!(PrivateKey::from_wif(&wif), Err(Error::Checksum));
    }

    #[test]
    fn test_wif_litecoin_round_trip() {
        let secret = SecretKey::from_slice(&hex::decode(SECRET_HEX).unwrap()).unwrap();
        let key = PrivateKey::new(secret, true, CoinType::Litecoin, Network::Mainnet);
        let wif = key.to_wif();
        let parsed = PrivateKey::from_wif(&wif).unwrap();
        assert_eq!(parsed.coin, CoinType::Litecoin);
        assert_eq!(parsed.network, Network::Mainnet);
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_p2pkh_address_from_pubkey() {
        // Public key and address from the classic worked example
        let pubkey = hex::decode(
            "0450863ad64a87ae8a2fe83c1af1a8403cb53f53e486d8511dad8a04887e5b2352\
             2cd470243453a299fa9e77237716103abc11a1df38855ed6f2ee187e9c582ba6",
        )
        .unwrap();
        assert_eq!(
            p2pkh_address(&pubkey, CoinType::Bitcoin, Network::Mainnet).unwrap(),
            "16UwLL9Risc3QfPqBUvKofHmBQ7wMtjvM"
        );
        assert!(p2pkh_address(&pubkey[..10], CoinType::Bitcoin, Network::Mainnet).is_err());
    }
}
