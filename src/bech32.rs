//! Bech32 codec and segwit address layer
//!
//! Generic base-32 encoding with the BCH-style checksum from BIP173, plus the
//! segwit layer that packs a witness version and program into it. The codec
//! operates on 5-bit groups; `convert_bits` regroups between 8-bit program
//! bytes and 5-bit symbols.

use crate::error::{Error, Result};
use crate::network::{self, CoinType, Network};

/// The 32-character bech32 alphabet
const CHARSET: [char; 32] = [
    'q', 'p', 'z', 'r', 'y', '9', 'x', '8', 'g', 'f', '2', 't', 'v', 'd', 'w', '0', 's', '3', 'j',
    'n', '5', '4', 'k', 'h', 'c', 'e', '6', 'm', 'u', 'a', '7', 'l',
];

/// Generator coefficients of the BCH checksum over GF(32)
const GENERATOR: [u32; 5] = [0x3b6a57b2, 0x26508e6d, 0x1ea119fa, 0x3d4233dd, 0x2a1462b3];

const SEPARATOR: char = '1';
const CHECKSUM_LEN: usize = 6;
const MIN_LEN: usize = 8;
const MAX_LEN: usize = 90;

fn charset_index(c: char) -> Option<u8> {
    CHARSET.iter().position(|&x| x == c).map(|i| i as u8)
}

fn polymod(values: &[u8]) -> u32 {
    let mut chk: u32 = 1;
    for &value in values {
        let top = chk >> 25;
        chk = (chk & 0x01ff_ffff) << 5 ^ u32::from(value);
        for (i, generator) in GENERATOR.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= generator;
            }
        }
    }
    chk
}

fn hrp_expand(hrp: &str) -> Vec<u8> {
    let bytes = hrp.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() * 2 + 1);
    out.extend(bytes.iter().map(|b| b >> 5));
    out.push(0);
    out.extend(bytes.iter().map(|b| b & 0x1f));
    out
}

fn create_checksum(hrp: &str, data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data);
    values.extend_from_slice(&[0u8; CHECKSUM_LEN]);
    let polymod = polymod(&values) ^ 1;
    let mut out = [0u8; CHECKSUM_LEN];
    for (i, value) in out.iter_mut().enumerate() {
        *value = ((polymod >> (5 * (5 - i))) & 0x1f) as u8;
    }
    out
}

/// True iff `data` (checksum groups included) verifies under `hrp`.
pub fn verify_checksum(hrp: &str, data: &[u8]) -> bool {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data);
    polymod(&values) == 1
}

/// Encode 5-bit groups under a human-readable part.
pub fn encode(hrp: &str, data: &[u8]) -> Result<String> {
    if hrp.is_empty() {
        return Err(Error::InvalidArgument("empty human-readable part".into()));
    }
    if hrp.bytes().any(|b| !(0x21..=0x7e).contains(&b)) || hrp.bytes().any(|b| b.is_ascii_uppercase())
    {
        return Err(Error::InvalidArgument(format!(
            "human-readable part out of range: {:?}",
            hrp
        )));
    }
    if let Some(&bad) = data.iter().find(|&&v| v >= 32) {
        return Err(Error::InvalidArgument(format!(
            "data value {} does not fit 5 bits",
            bad
        )));
    }

    let checksum = create_checksum(hrp, data);
    let mut out = String::with_capacity(hrp.len() + 1 + data.len() + CHECKSUM_LEN);
    out.push_str(hrp);
    out.push(SEPARATOR);
    for &value in data.iter().chain(checksum.iter()) {
        out.push(CHARSET[value as usize]);
    }
    Ok(out)
}

/// Decode a bech32 string into its lowercase human-readable part and 5-bit
/// data groups, checksum groups stripped.
pub fn decode(s: &str) -> Result<(String, Vec<u8>)> {
    if s.len() < MIN_LEN || s.len() > MAX_LEN {
        return Err(Error::Format(format!(
            "bech32 string length {} outside {}..={}",
            s.len(),
            MIN_LEN,
            MAX_LEN
        )));
    }
    let has_upper = s.bytes().any(|b| b.is_ascii_uppercase());
    let has_lower = s.bytes().any(|b| b.is_ascii_lowercase());
    if has_upper && has_lower {
        return Err(Error::Format("bech32 string mixes upper and lower case".into()));
    }
    if s.bytes().any(|b| !(0x21..=0x7e).contains(&b)) {
        return Err(Error::Format("bech32 character outside printable ASCII".into()));
    }

    let lower = s.to_lowercase();
    let pos = lower.rfind(SEPARATOR).ok_or(Error::MissingSeparator)?;
    if pos + 1 + CHECKSUM_LEN > lower.len() {
        return Err(Error::MissingSeparator);
    }
    let hrp = &lower[..pos];
    if hrp.is_empty() {
        return Err(Error::Format("bech32 string has no human-readable part".into()));
    }

    let data = lower[pos + 1..]
        .chars()
        .map(|c| charset_index(c).ok_or(Error::InvalidCharacter(c)))
        .collect::<Result<Vec<u8>>>()?;

    if !verify_checksum(hrp, &data) {
        return Err(Error::Checksum);
    }

    let payload = data[..data.len() - CHECKSUM_LEN].to_vec();
    Ok((hrp.to_string(), payload))
}

/// Regroup a bit stream from `from_bits`-wide to `to_bits`-wide groups.
///
/// With `pad` the final short group is flushed left-padded with zeros; without
/// it, leftover bits must be a canonical zero padding shorter than one input
/// group or the call fails with [`Error::InvalidPadding`].
pub fn convert_bits(data: &[u8], from_bits: u32, to_bits: u32, pad: bool) -> Result<Vec<u8>> {
    if from_bits == 0 || from_bits > 8 || to_bits == 0 || to_bits > 8 {
        return Err(Error::InvalidArgument(format!(
            "bit widths must be 1..=8, got {} -> {}",
            from_bits, to_bits
        )));
    }

    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let maxv: u32 = (1 << to_bits) - 1;
    let max_acc: u32 = (1 << (from_bits + to_bits - 1)) - 1;
    let mut out = Vec::with_capacity(data.len() * from_bits as usize / to_bits as usize + 1);

    for &value in data {
        if u32::from(value) >> from_bits != 0 {
            return Err(Error::InvalidArgument(format!(
                "input value {} does not fit {} bits",
                value, from_bits
            )));
        }
        acc = (acc << from_bits | u32::from(value)) & max_acc;
        bits += from_bits;
        while bits >= to_bits {
            bits -= to_bits;
            out.push(((acc >> bits) & maxv) as u8);
        }
    }

    if pad {
        if bits > 0 {
            out.push(((acc << (to_bits - bits)) & maxv) as u8);
        }
    } else if bits >= from_bits || (acc << (to_bits - bits)) & maxv != 0 {
        return Err(Error::InvalidPadding);
    }

    Ok(out)
}

/// A decoded segwit address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegwitAddress {
    /// Coin the human-readable part resolved to
    pub coin: CoinType,
    /// Network the human-readable part resolved to
    pub network: Network,
    /// Witness version, 0..=16
    pub witness_version: u8,
    /// Witness program, 2..=40 bytes
    pub program: Vec<u8>,
}

/// Encode a witness version and program under a human-readable part.
pub fn segwit_encode(hrp: &str, witness_version: u8, program: &[u8]) -> Result<String> {
    if witness_version > 16 {
        return Err(Error::Format(format!(
            "witness version {} out of range",
            witness_version
        )));
    }
    if program.len() < 2 || program.len() > 40 {
        return Err(Error::Format(format!(
            "witness program must be 2..=40 bytes, got {}",
            program.len()
        )));
    }
    let mut data = vec![witness_version];
    data.extend(convert_bits(program, 8, 5, true)?);
    encode(hrp, &data)
}

/// Decode a segwit address, resolving the human-readable part through the
/// network registry and validating the witness constraints.
pub fn segwit_decode(address: &str) -> Result<SegwitAddress> {
    let (hrp, data) = decode(address)?;
    let info = network::info_from_hrp(&hrp)?;

    let (&witness_version, rest) = data
        .split_first()
        .ok_or_else(|| Error::Format("segwit address carries no witness version".into()))?;
    if witness_version > 16 {
        return Err(Error::Format(format!(
            "witness version {} out of range",
            witness_version
        )));
    }

    let program = convert_bits(rest, 5, 8, false)?;
    if program.len() < 2 || program.len() > 40 {
        return Err(Error::Format(format!(
            "witness program must be 2..=40 bytes, got {}",
            program.len()
        )));
    }
    if witness_version == 0 && program.len() != 20 && program.len() != 32 {
        return Err(Error::Format(format!(
            "version 0 witness program must be 20 or 32 bytes, got {}",
            program.len()
        )));
    }

    Ok(SegwitAddress {
        coin: info.coin,
        network: info.network,
        witness_version,
        program,
    })
}
