//! BIP32 hierarchical deterministic key derivation
//!
//! Extended private and public keys, master-key creation from a seed, normal
//! and hardened child derivation, and the versioned 78-byte serialization
//! wrapped in Base58Check.
//!
//! Extended keys are immutable value types: derivation returns a new key and
//! never mutates the parent. A public-only key can never produce a private
//! child, and hardened derivation from a public-only key fails with
//! [`Error::HardenedDerivationOnPublicKey`].

use core::fmt;
use core::str::FromStr;

use secp256k1::{PublicKey, Scalar, Secp256k1, SecretKey, Signing, Verification};

use crate::base58;
use crate::error::{Error, Result};
use crate::hashes;
use crate::network::{self, CoinType, Network};

/// Key used as the HMAC seed when deriving a master key
const MASTER_KEY_DOMAIN: &[u8] = b"Bitcoin seed";

/// First index of the hardened derivation range
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// A child index, either normal or hardened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildNumber {
    /// Non-hardened index, derivable from the parent public key alone
    Normal {
        /// Index within the non-hardened range (0..2^31)
        index: u32,
    },
    /// Hardened index, requires the parent private key
    Hardened {
        /// Index within the hardened range (0..2^31)
        index: u32,
    },
}

impl ChildNumber {
    /// Normal child number from an index below 2^31.
    pub fn from_normal_idx(index: u32) -> Result<Self> {
        if index >= HARDENED_OFFSET {
            return Err(Error::InvalidArgument(format!(
                "child index {} out of range",
                index
            )));
        }
        Ok(ChildNumber::Normal { index })
    }

    /// Hardened child number from an index below 2^31.
    pub fn from_hardened_idx(index: u32) -> Result<Self> {
        if index >= HARDENED_OFFSET {
            return Err(Error::InvalidArgument(format!(
                "child index {} out of range",
                index
            )));
        }
        Ok(ChildNumber::Hardened { index })
    }

    /// True for hardened child numbers.
    pub fn is_hardened(&self) -> bool {
        matches!(self, ChildNumber::Hardened { .. })
    }

    /// Raw wire representation: hardened numbers carry the top bit.
    pub fn to_u32(self) -> u32 {
        match self {
            ChildNumber::Normal { index } => index,
            ChildNumber::Hardened { index } => HARDENED_OFFSET | index,
        }
    }
}

impl From<u32> for ChildNumber {
    fn from(raw: u32) -> Self {
        if raw & HARDENED_OFFSET != 0 {
            ChildNumber::Hardened { index: raw & !HARDENED_OFFSET }
        } else {
            ChildNumber::Normal { index: raw }
        }
    }
}

impl fmt::Display for ChildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildNumber::Normal { index } => write!(f, "{}", index),
            ChildNumber::Hardened { index } => write!(f, "{}'", index),
        }
    }
}

impl FromStr for ChildNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (digits, hardened) = match s.strip_suffix(&['\'', 'h', 'H'][..]) {
            Some(digits) => (digits, true),
            None => (s, false),
        };
        let index = digits
            .parse::<u32>()
            .map_err(|_| Error::Format(format!("invalid child number: {:?}", s)))?;
        if hardened {
            ChildNumber::from_hardened_idx(index)
        } else {
            ChildNumber::from_normal_idx(index)
        }
    }
}

/// An ordered list of child numbers, e.g. `m/44'/0'/0'/0/0`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DerivationPath(Vec<ChildNumber>);

impl DerivationPath {
    /// The empty path `m`.
    pub fn master() -> Self {
        DerivationPath(Vec::new())
    }

    /// Append a child number.
    pub fn push(&mut self, child: ChildNumber) {
        self.0.push(child);
    }

    /// Iterate over the child numbers.
    pub fn iter(&self) -> core::slice::Iter<'_, ChildNumber> {
        self.0.iter()
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the master path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<ChildNumber>> for DerivationPath {
    fn from(children: Vec<ChildNumber>) -> Self {
        DerivationPath(children)
    }
}

impl From<&[ChildNumber]> for DerivationPath {
    fn from(children: &[ChildNumber]) -> Self {
        DerivationPath(children.to_vec())
    }
}

impl AsRef<[ChildNumber]> for DerivationPath {
    fn as_ref(&self) -> &[ChildNumber] {
        &self.0
    }
}

impl FromStr for DerivationPath {
    type Err = Error;

    fn from_str(path: &str) -> Result<Self> {
        let mut parts = path.split('/');
        if parts.next() != Some("m") {
            return Err(Error::Format(format!(
                "derivation path must start with m: {:?}",
                path
            )));
        }
        let children = parts.map(str::parse).collect::<Result<Vec<_>>>()?;
        Ok(DerivationPath(children))
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for child in &self.0 {
            write!(f, "/{}", child)?;
        }
        Ok(())
    }
}

/// Extended private key: one private node of a derivation tree
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ExtendedPrivKey {
    /// Distance from the master node
    pub depth: u8,
    /// First 4 bytes of the parent key hash, big-endian; 0 for the master
    pub parent_fingerprint: u32,
    /// Child number this key was derived at; Normal(0) for the master
    pub child_number: ChildNumber,
    /// Entropy mixed into child derivation
    pub chain_code: [u8; 32],
    /// The private scalar
    pub private_key: SecretKey,
}

impl fmt::Debug for ExtendedPrivKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedPrivKey")
            .field("depth", &self.depth)
            .field("parent_fingerprint", &self.parent_fingerprint)
            .field("child_number", &self.child_number)
            .field("private_key", &"<hidden>")
            .finish()
    }
}

/// Extended public key: one public-only node of a derivation tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtendedPubKey {
    /// Distance from the master node
    pub depth: u8,
    /// First 4 bytes of the parent key hash, big-endian; 0 for the master
    pub parent_fingerprint: u32,
    /// Child number this key was derived at
    pub child_number: ChildNumber,
    /// Entropy mixed into child derivation
    pub chain_code: [u8; 32],
    /// The public point, stored compressed on the wire
    pub public_key: PublicKey,
}

/// Either kind of extended key, as recovered from a serialized string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedKey {
    /// A private node
    Private(ExtendedPrivKey),
    /// A public-only node
    Public(ExtendedPubKey),
}

impl ExtendedKey {
    /// True if this key holds a private component.
    pub fn is_private(&self) -> bool {
        matches!(self, ExtendedKey::Private(_))
    }

    /// Decode either key kind; the version prefix picks the variant.
    pub fn from_base58(s: &str) -> Result<(Self, CoinType, Network)> {
        let (raw, coin, net, is_private) = decode_raw(s)?;
        let key = if is_private {
            ExtendedKey::Private(ExtendedPrivKey::from_raw(&raw)?)
        } else {
            ExtendedKey::Public(ExtendedPubKey::from_raw(&raw)?)
        };
        Ok((key, coin, net))
    }
}

/// The fixed 78-byte layout. Packing and unpacking happen here so offset
/// arithmetic exists in exactly one place.
struct RawExtendedKey {
    version: [u8; 4],
    depth: u8,
    parent_fingerprint: u32,
    child_number: u32,
    chain_code: [u8; 32],
    key_material: [u8; 33],
}

impl RawExtendedKey {
    const LEN: usize = 78;

    fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        buf[0..4].copy_from_slice(&self.version);
        buf[4] = self.depth;
        buf[5..9].copy_from_slice(&self.parent_fingerprint.to_be_bytes());
        buf[9..13].copy_from_slice(&self.child_number.to_be_bytes());
        buf[13..45].copy_from_slice(&self.chain_code);
        buf[45..78].copy_from_slice(&self.key_material);
        buf
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() != Self::LEN {
            return Err(Error::Format(format!(
                "extended key payload must be {} bytes, got {}",
                Self::LEN,
                data.len()
            )));
        }
        let mut version = [0u8; 4];
        version.copy_from_slice(&data[0..4]);
        let mut fingerprint = [0u8; 4];
        fingerprint.copy_from_slice(&data[5..9]);
        let mut child = [0u8; 4];
        child.copy_from_slice(&data[9..13]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&data[13..45]);
        let mut key_material = [0u8; 33];
        key_material.copy_from_slice(&data[45..78]);
        Ok(RawExtendedKey {
            version,
            depth: data[4],
            parent_fingerprint: u32::from_be_bytes(fingerprint),
            child_number: u32::from_be_bytes(child),
            chain_code,
            key_material,
        })
    }
}

/// Base58 decode, checksum and version resolution shared by both key kinds.
fn decode_raw(s: &str) -> Result<(RawExtendedKey, CoinType, Network, bool)> {
    let data = base58::decode(s)?;
    if data.len() != RawExtendedKey::LEN + 4 {
        return Err(Error::Format(format!(
            "extended key must decode to 82 bytes, got {}",
            data.len()
        )));
    }
    if !hashes::verify_checksum(&data) {
        return Err(Error::Checksum);
    }
    let raw = RawExtendedKey::from_bytes(&data[..RawExtendedKey::LEN])?;
    let (coin, net, is_private) = network::lookup_bip32_version(raw.version)?;
    if raw.depth == 0 && (raw.parent_fingerprint != 0 || raw.child_number != 0) {
        return Err(Error::Format(
            "zero-depth key with non-zero parent fingerprint or child number".into(),
        ));
    }
    Ok((raw, coin, net, is_private))
}

fn fingerprint_of(key: &PublicKey) -> u32 {
    let hash = hashes::hash160(&key.serialize());
    u32::from_be_bytes([hash[0], hash[1], hash[2], hash[3]])
}

fn split_hmac(i: [u8; 64]) -> ([u8; 32], [u8; 32]) {
    let mut left = [0u8; 32];
    let mut right = [0u8; 32];
    left.copy_from_slice(&i[..32]);
    right.copy_from_slice(&i[32..]);
    (left, right)
}

impl ExtendedPrivKey {
    /// Master key from seed entropy: `HMAC-SHA512(seed, "Bitcoin seed")`,
    /// left half the scalar, right half the chain code.
    pub fn new_master(seed: &[u8]) -> Result<ExtendedPrivKey> {
        let (left, right) = split_hmac(hashes::hmac_sha512(seed, MASTER_KEY_DOMAIN)?);
        let private_key = SecretKey::from_slice(&left).map_err(|_| Error::InvalidSeed)?;
        Ok(ExtendedPrivKey {
            depth: 0,
            parent_fingerprint: 0,
            child_number: ChildNumber::Normal { index: 0 },
            chain_code: right,
            private_key,
        })
    }

    /// Derive one child. Hardened children commit to the parent scalar,
    /// normal children to the parent public key.
    pub fn ckd_priv<C: Signing>(
        &self,
        secp: &Secp256k1<C>,
        child: ChildNumber,
    ) -> Result<ExtendedPrivKey> {
        let depth = self.depth.checked_add(1).ok_or(Error::DepthExceeded)?;

        let mut message = Vec::with_capacity(37);
        match child {
            ChildNumber::Normal { .. } => {
                message
                    .extend_from_slice(&PublicKey::from_secret_key(secp, &self.private_key).serialize());
            }
            ChildNumber::Hardened { .. } => {
                message.push(0x00);
                message.extend_from_slice(&self.private_key.secret_bytes());
            }
        }
        message.extend_from_slice(&child.to_u32().to_be_bytes());

        let (left, right) = split_hmac(hashes::hmac_sha512(&message, &self.chain_code)?);
        let tweak = Scalar::from_be_bytes(left).map_err(|_| Error::InvalidChild)?;
        let private_key = self.private_key.add_tweak(&tweak).map_err(|_| Error::InvalidChild)?;

        Ok(ExtendedPrivKey {
            depth,
            parent_fingerprint: self.fingerprint(secp),
            child_number: child,
            chain_code: right,
            private_key,
        })
    }

    /// Derive along a full path, master first.
    pub fn derive_priv<C: Signing>(
        &self,
        secp: &Secp256k1<C>,
        path: &DerivationPath,
    ) -> Result<ExtendedPrivKey> {
        let mut key = *self;
        for child in path.iter() {
            key = key.ckd_priv(secp, *child)?;
        }
        Ok(key)
    }

    /// First 4 bytes of HASH160 of the compressed public key, big-endian.
    pub fn fingerprint<C: Signing>(&self, secp: &Secp256k1<C>) -> u32 {
        fingerprint_of(&PublicKey::from_secret_key(secp, &self.private_key))
    }

    /// Serialize for a target coin and network.
    pub fn to_base58(&self, coin: CoinType, network: Network) -> String {
        let mut key_material = [0u8; 33];
        key_material[1..].copy_from_slice(&self.private_key.secret_bytes());
        let raw = RawExtendedKey {
            version: network::bip32_version(coin, network, true),
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            child_number: self.child_number.to_u32(),
            chain_code: self.chain_code,
            key_material,
        };
        base58::check_encode(&raw.to_bytes())
    }

    /// Parse a serialized private key, returning the network the version
    /// prefix committed to.
    pub fn from_base58(s: &str) -> Result<(ExtendedPrivKey, CoinType, Network)> {
        let (raw, coin, net, is_private) = decode_raw(s)?;
        if !is_private {
            return Err(Error::Format(
                "version prefix denotes a public key".into(),
            ));
        }
        Ok((ExtendedPrivKey::from_raw(&raw)?, coin, net))
    }

    fn from_raw(raw: &RawExtendedKey) -> Result<ExtendedPrivKey> {
        if raw.key_material[0] != 0x00 {
            return Err(Error::Format(
                "private key material must begin with a zero byte".into(),
            ));
        }
        Ok(ExtendedPrivKey {
            depth: raw.depth,
            parent_fingerprint: raw.parent_fingerprint,
            child_number: ChildNumber::from(raw.child_number),
            chain_code: raw.chain_code,
            private_key: SecretKey::from_slice(&raw.key_material[1..])?,
        })
    }
}

impl ExtendedPubKey {
    /// The public half of a private node.
    pub fn from_priv<C: Signing>(secp: &Secp256k1<C>, key: &ExtendedPrivKey) -> ExtendedPubKey {
        ExtendedPubKey {
            depth: key.depth,
            parent_fingerprint: key.parent_fingerprint,
            child_number: key.child_number,
            chain_code: key.chain_code,
            public_key: PublicKey::from_secret_key(secp, &key.private_key),
        }
    }

    /// Derive one child without the private key. Only normal children are
    /// reachable from here.
    pub fn ckd_pub<C: Verification>(
        &self,
        secp: &Secp256k1<C>,
        child: ChildNumber,
    ) -> Result<ExtendedPubKey> {
        if child.is_hardened() {
            return Err(Error::HardenedDerivationOnPublicKey);
        }
        let depth = self.depth.checked_add(1).ok_or(Error::DepthExceeded)?;

        let mut message = Vec::with_capacity(37);
        message.extend_from_slice(&self.public_key.serialize());
        message.extend_from_slice(&child.to_u32().to_be_bytes());

        let (left, right) = split_hmac(hashes::hmac_sha512(&message, &self.chain_code)?);
        let tweak = Scalar::from_be_bytes(left).map_err(|_| Error::InvalidChild)?;
        // Fails when the tweaked point would be the identity
        let public_key =
            self.public_key.add_exp_tweak(secp, &tweak).map_err(|_| Error::InvalidChild)?;

        Ok(ExtendedPubKey {
            depth,
            parent_fingerprint: self.fingerprint(),
            child_number: child,
            chain_code: right,
            public_key,
        })
    }

    /// Derive along a full path of normal children.
    pub fn derive_pub<C: Verification>(
        &self,
        secp: &Secp256k1<C>,
        path: &DerivationPath,
    ) -> Result<ExtendedPubKey> {
        let mut key = *self;
        for child in path.iter() {
            key = key.ckd_pub(secp, *child)?;
        }
        Ok(key)
    }

    /// First 4 bytes of HASH160 of the compressed public key, big-endian.
    pub fn fingerprint(&self) -> u32 {
        fingerprint_of(&self.public_key)
    }

    /// Serialize for a target coin and network.
    pub fn to_base58(&self, coin: CoinType, network: Network) -> String {
        let raw = RawExtendedKey {
            version: network::bip32_version(coin, network, false),
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            child_number: self.child_number.to_u32(),
            chain_code: self.chain_code,
            key_material: self.public_key.serialize(),
        };
        base58::check_encode(&raw.to_bytes())
    }

    /// Parse a serialized public key, returning the network the version
    /// prefix committed to.
    pub fn from_base58(s: &str) -> Result<(ExtendedPubKey, CoinType, Network)> {
        let (raw, coin, net, is_private) = decode_raw(s)?;
        if is_private {
            return Err(Error::Format(
                "version prefix denotes a private key".into(),
            ));
        }
        Ok((ExtendedPubKey::from_raw(&raw)?, coin, net))
    }

    fn from_raw(raw: &RawExtendedKey) -> Result<ExtendedPubKey> {
        Ok(ExtendedPubKey {
            depth: raw.depth,
            parent_fingerprint: raw.parent_fingerprint,
            child_number: ChildNumber::from(raw.child_number),
            chain_code: raw.chain_code,
            public_key: PublicKey::from_slice(&raw.key_material)?,
        })
    }
}
