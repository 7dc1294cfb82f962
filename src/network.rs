//! Network and version constant registry
//!
//! Static tables mapping (coin, network) to the header bytes used by
//! addresses, WIF private keys and BIP32 extended keys, plus the reverse
//! lookups. Built once as constants, never mutated.

use crate::error::{Error, Result};

/// Supported coins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoinType {
    /// Bitcoin
    Bitcoin,
    /// Litecoin
    Litecoin,
}

/// Supported networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    /// Production network
    Mainnet,
    /// Test network
    Testnet,
}

/// Header bytes and bech32 prefix for one (coin, network) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkInfo {
    /// Coin this entry belongs to
    pub coin: CoinType,
    /// Network this entry belongs to
    pub network: Network,
    /// First byte of P2PKH addresses
    pub pubkey_hash_header: u8,
    /// First byte of P2SH addresses
    pub script_hash_header: u8,
    /// First byte of WIF-encoded private keys
    pub wif_header: u8,
    /// Human-readable part of segwit addresses
    pub bech32_hrp: &'static str,
}

/// Bitcoin mainnet constants
pub const BITCOIN: NetworkInfo = NetworkInfo {
    coin: CoinType::Bitcoin,
    network: Network::Mainnet,
    pubkey_hash_header: 0x00,
    script_hash_header: 0x05,
    wif_header: 0x80,
    bech32_hrp: "bc",
};

/// Bitcoin testnet constants
pub const BITCOIN_TESTNET: NetworkInfo = NetworkInfo {
    coin: CoinType::Bitcoin,
    network: Network::Testnet,
    pubkey_hash_header: 0x6f,
    script_hash_header: 0xc4,
    wif_header: 0xef,
    bech32_hrp: "tb",
};

/// Litecoin mainnet constants
pub const LITECOIN: NetworkInfo = NetworkInfo {
    coin: CoinType::Litecoin,
    network: Network::Mainnet,
    pubkey_hash_header: 0x30,
    script_hash_header: 0x05,
    wif_header: 0xb0,
    bech32_hrp: "ltc",
};

/// Litecoin testnet constants
pub const LITECOIN_TESTNET: NetworkInfo = NetworkInfo {
    coin: CoinType::Litecoin,
    network: Network::Testnet,
    pubkey_hash_header: 0x6f,
    script_hash_header: 0xc4,
    wif_header: 0xef,
    bech32_hrp: "tltc",
};

// Lookup order matters: testnet header bytes are shared between coins and
// resolve to Bitcoin.
const NETWORKS: [&NetworkInfo; 4] = [&BITCOIN, &BITCOIN_TESTNET, &LITECOIN, &LITECOIN_TESTNET];

/// BIP32 4-byte version prefixes as (prefix, coin, network, is_private)
const BIP32_VERSIONS: [([u8; 4], CoinType, Network, bool); 8] = [
    ([0x04, 0x88, 0xad, 0xe4], CoinType::Bitcoin, Network::Mainnet, true),
    ([0x04, 0x88, 0xb2, 0x1e], CoinType::Bitcoin, Network::Mainnet, false),
    ([0x04, 0x35, 0x83, 0x94], CoinType::Bitcoin, Network::Testnet, true),
    ([0x04, 0x35, 0x87, 0xcf], CoinType::Bitcoin, Network::Testnet, false),
    ([0x01, 0x9d, 0x9c, 0xfe], CoinType::Litecoin, Network::Mainnet, true),
    ([0x01, 0x9d, 0xa4, 0x62], CoinType::Litecoin, Network::Mainnet, false),
    ([0x04, 0x36, 0xef, 0x7d], CoinType::Litecoin, Network::Testnet, true),
    ([0x04, 0x36, 0xf6, 0xe1], CoinType::Litecoin, Network::Testnet, false),
];

/// Constants for a (coin, network) pair.
pub fn network_info(coin: CoinType, network: Network) -> &'static NetworkInfo {
    match (coin, network) {
        (CoinType::Bitcoin, Network::Mainnet) => &BITCOIN,
        (CoinType::Bitcoin, Network::Testnet) => &BITCOIN_TESTNET,
        (CoinType::Litecoin, Network::Mainnet) => &LITECOIN,
        (CoinType::Litecoin, Network::Testnet) => &LITECOIN_TESTNET,
    }
}

/// Resolve a P2PKH or WIF header byte to its network entry.
pub fn info_from_header(header: u8) -> Result<&'static NetworkInfo> {
    NETWORKS
        .iter()
        .find(|info| header == info.pubkey_hash_header || header == info.wif_header)
        .copied()
        .ok_or(Error::UnknownVersion)
}

/// Resolve a bech32 human-readable part to its network entry.
pub fn info_from_hrp(hrp: &str) -> Result<&'static NetworkInfo> {
    NETWORKS
        .iter()
        .find(|info| hrp == info.bech32_hrp)
        .copied()
        .ok_or(Error::UnknownVersion)
}

/// BIP32 version prefix for a (coin, network, key kind) triple.
pub fn bip32_version(coin: CoinType, network: Network, is_private: bool) -> [u8; 4] {
    use CoinType::*;
    use Network::*;
    match (coin, network, is_private) {
        (Bitcoin, Mainnet, true) => [0x04, 0x88, 0xad, 0xe4],
        (Bitcoin, Mainnet, false) => [0x04, 0x88, 0xb2, 0x1e],
        (Bitcoin, Testnet, true) => [0x04, 0x35, 0x83, 0x94],
        (Bitcoin, Testnet, false) => [0x04, 0x35, 0x87, 0xcf],
        (Litecoin, Mainnet, true) => [0x01, 0x9d, 0x9c, 0xfe],
        (Litecoin, Mainnet, false) => [0x01, 0x9d, 0xa4, 0x62],
        (Litecoin, Testnet, true) => [0x04, 0x36, 0xef, 0x7d],
        (Litecoin, Testnet, false) => [0x04, 0x36, 0xf6, 0xe1],
    }
}

/// Reverse lookup of a BIP32 version prefix.
pub fn lookup_bip32_version(prefix: [u8; 4]) -> Result<(CoinType, Network, bool)> {
    BIP32_VERSIONS
        .iter()
        .find(|(p, _, _, _)| *p == prefix)
        .map(|(_, coin, network, is_private)| (*coin, *network, *is_private))
        .ok_or(Error::UnknownVersion)
}
