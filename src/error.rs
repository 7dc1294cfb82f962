//! Error types for the coin-keys library

use core::fmt;

use std::error;

/// Result type alias for coin-keys operations
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur in coin-keys operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed or empty input
    InvalidArgument(String),
    /// Wrong length or bad structure
    Format(String),
    /// Checksum mismatch
    Checksum,
    /// Unregistered version prefix or network header byte
    UnknownVersion,
    /// Seed produced a scalar outside the curve order
    InvalidSeed,
    /// Child derivation produced an out-of-range scalar or the identity
    InvalidChild,
    /// Hardened derivation requested from a public-only key
    HardenedDerivationOnPublicKey,
    /// Derivation past depth 255
    DepthExceeded,
    /// Key material in a shape this library does not handle
    UnsupportedKeyFormat(String),
    /// Decrypted key does not match the address committed to by the salt
    WrongPassphrase,
    /// Bech32 string without a separator or with a truncated checksum
    MissingSeparator,
    /// Character outside the bech32 alphabet
    InvalidCharacter(char),
    /// Non-canonical padding bits in a bech32 data part
    InvalidPadding,
    /// Base58 decoding error
    Base58,
    /// Secp256k1 error
    Secp256k1(secp256k1::Error),
    /// Digest or KDF primitive failure
    Digest,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(s) => write!(f, "invalid argument: {}", s),
            Error::Format(s) => write!(f, "format error: {}", s),
            Error::Checksum => write!(f, "checksum mismatch"),
            Error::UnknownVersion => write!(f, "unknown version prefix"),
            Error::InvalidSeed => write!(f, "seed produced an invalid master key"),
            Error::InvalidChild => write!(f, "derived child key is invalid"),
            Error::HardenedDerivationOnPublicKey => {
                write!(f, "hardened derivation requires a private key")
            }
            Error::DepthExceeded => write!(f, "derivation depth exceeds 255"),
            Error::UnsupportedKeyFormat(s) => write!(f, "unsupported key format: {}", s),
            Error::WrongPassphrase => write!(f, "wrong passphrase"),
            Error::MissingSeparator => write!(f, "missing bech32 separator"),
            Error::InvalidCharacter(c) => write!(f, "invalid bech32 character: {}", c),
            Error::InvalidPadding => write!(f, "non-canonical bech32 padding"),
            Error::Base58 => write!(f, "base58 decoding error"),
            Error::Secp256k1(e) => write!(f, "secp256k1 error: {}", e),
            Error::Digest => write!(f, "digest primitive failure"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Secp256k1(e) => Some(e),
            _ => None,
        }
    }
}

impl From<secp256k1::Error> for Error {
    fn from(e: secp256k1::Error) -> Self {
        Error::Secp256k1(e)
    }
}

impl From<bs58::decode::Error> for Error {
    fn from(_: bs58::decode::Error) -> Self {
        Error::Base58
    }
}

impl From<hmac::digest::InvalidLength> for Error {
    fn from(_: hmac::digest::InvalidLength) -> Self {
        Error::Digest
    }
}
