//! Bech32 / Bech32m and the SegWit address layer on top of them.
//!
//! Implemented against BIP-173 / BIP-350:
//!
//! ```text
//! address  = hrp "1" data checksum
//! data     = 5-bit groups from the charset "qpzry9x8gf2tvdw0s3jn54khce6mua7l"
//! checksum = 6 groups; polymod == 1 (Bech32) or 0x2bc830a3 (Bech32m)
//! segwit   = [witness version] ++ convert_bits(program, 8, 5, pad)
//! ```
//!
//! Witness version 0 uses Bech32; versions 1..=16 use Bech32m.

use crate::error::CryptoError;

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

const GENERATOR: [u32; 5] = [0x3b6a_57b2, 0x2650_8e6d, 0x1ea1_19fa, 0x3d42_33dd, 0x2a14_62b3];

const BECH32_CONST: u32 = 1;
const BECH32M_CONST: u32 = 0x2bc8_30a3;

/// Maximum overall string length permitted by BIP-173.
const MAX_LENGTH: usize = 90;

/// Checksum flavor of an encoded string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bech32Variant {
    Bech32,
    Bech32m,
}

impl Bech32Variant {
    fn checksum_const(self) -> u32 {
        match self {
            Bech32Variant::Bech32 => BECH32_CONST,
            Bech32Variant::Bech32m => BECH32M_CONST,
        }
    }
}

fn polymod(values: &[u8]) -> u32 {
    let mut chk: u32 = 1;
    for &v in values {
        let b = chk >> 25;
        chk = (chk & 0x01ff_ffff) << 5 ^ u32::from(v);
        for (i, gen) in GENERATOR.iter().enumerate() {
            if (b >> i) & 1 == 1 {
                chk ^= gen;
            }
        }
    }
    chk
}

fn hrp_expand(hrp: &str) -> Vec<u8> {
    let bytes = hrp.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() * 2 + 1);
    out.extend(bytes.iter().map(|c| c >> 5));
    out.push(0);
    out.extend(bytes.iter().map(|c| c & 31));
    out
}

fn validate_hrp(hrp: &str) -> Result<(), CryptoError> {
    if hrp.is_empty() || hrp.len() > 83 {
        return Err(CryptoError::InvalidInput(format!(
            "human-readable part length {}",
            hrp.len()
        )));
    }
    if hrp.bytes().any(|b| !(33..=126).contains(&b)) {
        return Err(CryptoError::InvalidCharacter(
            "human-readable part outside US-ASCII 33..=126".into(),
        ));
    }
    Ok(())
}

fn create_checksum(hrp: &str, data: &[u8], variant: Bech32Variant) -> [u8; 6] {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data);
    values.extend_from_slice(&[0u8; 6]);
    let pm = polymod(&values) ^ variant.checksum_const();
    let mut checksum = [0u8; 6];
    for (i, c) in checksum.iter_mut().enumerate() {
        *c = ((pm >> (5 * (5 - i))) & 31) as u8;
    }
    checksum
}

/// Encodes 5-bit `data` under `hrp` with the checksum of `variant`.
///
/// The human-readable part is lowercased; the result is always lowercase.
pub fn encode(hrp: &str, data: &[u8], variant: Bech32Variant) -> Result<String, CryptoError> {
    let hrp = hrp.to_lowercase();
    validate_hrp(&hrp)?;
    if let Some(&bad) = data.iter().find(|&&v| v > 31) {
        return Err(CryptoError::InvalidInput(format!(
            "value {bad} does not fit in 5 bits"
        )));
    }
    let total = hrp.len() + 1 + data.len() + 6;
    if total > MAX_LENGTH {
        return Err(CryptoError::InvalidInput(format!(
            "encoded length {total} exceeds {MAX_LENGTH}"
        )));
    }

    let checksum = create_checksum(&hrp, data, variant);
    let mut out = String::with_capacity(total);
    out.push_str(&hrp);
    out.push('1');
    for &v in data.iter().chain(checksum.iter()) {
        out.push(CHARSET[v as usize] as char);
    }
    Ok(out)
}

/// Decodes a Bech32/Bech32m string into `(hrp, 5-bit data, variant)`.
pub fn decode(s: &str) -> Result<(String, Vec<u8>, Bech32Variant), CryptoError> {
    if s.len() > MAX_LENGTH {
        return Err(CryptoError::InvalidInput(format!(
            "length {} exceeds {MAX_LENGTH}",
            s.len()
        )));
    }
    let has_lower = s.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = s.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(CryptoError::InvalidCharacter("mixed case".into()));
    }
    let s = s.to_lowercase();

    let sep = s
        .rfind('1')
        .ok_or_else(|| CryptoError::InvalidInput("missing separator".into()))?;
    if sep < 1 {
        return Err(CryptoError::InvalidInput("empty human-readable part".into()));
    }
    if sep + 7 > s.len() {
        return Err(CryptoError::InvalidInput("checksum too short".into()));
    }

    let hrp = &s[..sep];
    validate_hrp(hrp)?;

    let mut data = Vec::with_capacity(s.len() - sep - 1);
    for c in s[sep + 1..].bytes() {
        let v = CHARSET
            .iter()
            .position(|&x| x == c)
            .ok_or_else(|| CryptoError::InvalidCharacter(format!("'{}'", c as char)))?;
        data.push(v as u8);
    }

    let mut values = hrp_expand(hrp);
    values.extend_from_slice(&data);
    let variant = match polymod(&values) {
        BECH32_CONST => Bech32Variant::Bech32,
        BECH32M_CONST => Bech32Variant::Bech32m,
        _ => return Err(CryptoError::ChecksumMismatch),
    };

    data.truncate(data.len() - 6);
    Ok((hrp.to_string(), data, variant))
}

/// Regroups `data` from `from`-bit to `to`-bit values.
///
/// With `pad = false`, leftover bits must be zero padding of fewer than
/// `from` bits, otherwise the input is rejected.
pub fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Result<Vec<u8>, CryptoError> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let maxv: u32 = (1 << to) - 1;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);

    for &value in data {
        let value = u32::from(value);
        if value >> from != 0 {
            return Err(CryptoError::InvalidInput(format!(
                "value {value} does not fit in {from} bits"
            )));
        }
        acc = (acc << from) | value;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & maxv) as u8);
        }
    }

    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & maxv) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & maxv) != 0 {
        return Err(CryptoError::InvalidInput("invalid bit-group padding".into()));
    }

    Ok(out)
}

/// Encodes a SegWit address: witness version + program under `hrp`.
pub fn encode_segwit(hrp: &str, version: u8, program: &[u8]) -> Result<String, CryptoError> {
    validate_segwit(version, program)?;
    let mut data = vec![version];
    data.extend(convert_bits(program, 8, 5, true)?);
    let variant = if version == 0 {
        Bech32Variant::Bech32
    } else {
        Bech32Variant::Bech32m
    };
    encode(hrp, &data, variant)
}

/// Decodes a SegWit address into `(hrp, witness version, program)`.
///
/// Enforces the BIP-173/350 rules: version 0 must use Bech32, versions
/// 1..=16 must use Bech32m, and program lengths must be valid for the
/// version.
pub fn decode_segwit(addr: &str) -> Result<(String, u8, Vec<u8>), CryptoError> {
    let (hrp, data, variant) = decode(addr)?;
    let (&version, rest) = data
        .split_first()
        .ok_or_else(|| CryptoError::InvalidInput("missing witness version".into()))?;

    let expected = if version == 0 {
        Bech32Variant::Bech32
    } else {
        Bech32Variant::Bech32m
    };
    if variant != expected {
        return Err(CryptoError::ChecksumMismatch);
    }

    let program = convert_bits(rest, 5, 8, false)?;
    validate_segwit(version, &program)?;
    Ok((hrp, version, program))
}

fn validate_segwit(version: u8, program: &[u8]) -> Result<(), CryptoError> {
    if version > 16 {
        return Err(CryptoError::InvalidInput(format!(
            "witness version {version}"
        )));
    }
    if !(2..=40).contains(&program.len()) {
        return Err(CryptoError::InvalidInput(format!(
            "witness program length {}",
            program.len()
        )));
    }
    if version == 0 && program.len() != 20 && program.len() != 32 {
        return Err(CryptoError::InvalidInput(format!(
            "v0 witness program length {}",
            program.len()
        )));
    }
    if version == 1 && program.len() != 32 {
        return Err(CryptoError::InvalidInput(format!(
            "v1 witness program length {}",
            program.len()
        )));
    }
    Ok(())
}
