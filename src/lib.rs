//! Coin Keys Library
//!
//! Key-management building blocks for Bitcoin and Litecoin: BIP32
//! hierarchical deterministic key derivation, BIP38 passphrase-encrypted
//! private keys, WIF private-key encoding, and the bech32 segwit address
//! codec, over a static network/version registry.
//!
//! Everything here is a synchronous pure function over immutable values; the
//! only expensive call is the scrypt derivation inside [`bip38`].

pub mod base58;
pub mod bech32;
pub mod bip32;
pub mod bip38;
pub mod error;
pub mod hashes;
pub mod key;
pub mod network;

pub use secp256k1;

pub use bech32::SegwitAddress;
pub use bip32::{ChildNumber, DerivationPath, ExtendedKey, ExtendedPrivKey, ExtendedPubKey};
pub use error::{Error, Result};
pub use key::PrivateKey;
pub use network::{CoinType, Network, NetworkInfo};

/// Re-export commonly used types
pub mod prelude {
    pub use super::{
        ChildNumber, CoinType, DerivationPath, Error, ExtendedPrivKey, ExtendedPubKey, Network,
        PrivateKey, Result, SegwitAddress,
    };
}
