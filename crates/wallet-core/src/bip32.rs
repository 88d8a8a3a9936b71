//! BIP-32 hierarchical deterministic derivation over secp256k1.
//!
//! ```text
//! master:       I = HMAC-SHA512("Bitcoin seed", seed)
//! hardened:     I = HMAC-SHA512(c_par, 0x00 || k_par || ser32(i))
//! non-hardened: I = HMAC-SHA512(c_par, ser_P(K_par) || ser32(i))
//! child key:    k_i = (I_L + k_par) mod n
//! ```
//!
//! `I_L >= n` or a zero child scalar is a [`WalletError::DerivationInvalid`]
//! (per BIP-32 the caller moves on to the next index). Extended keys wipe
//! their scalars on drop; `destroy` wipes in place and is idempotent.

use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::PrimeField;
use k256::{ProjectivePoint, Scalar};
use zeroize::Zeroize;

use crypto_utils::hash::hmac_sha512;

use crate::error::WalletError;

/// Hardened-index offset (2^31).
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Parses `m`, `m/44'/60'/0'/0/0`, `m/44h/...` into raw indices with the
/// hardened bit set. The bare `m` is the master (empty segment list).
pub fn parse_path(path: &str) -> Result<Vec<u32>, WalletError> {
    let trimmed = path.trim();
    let rest = trimmed
        .strip_prefix('m')
        .ok_or_else(|| WalletError::InvalidInput(format!("path '{trimmed}' must start with 'm'")))?;
    if rest.is_empty() {
        return Ok(Vec::new());
    }
    let rest = rest.strip_prefix('/').ok_or_else(|| {
        WalletError::InvalidInput(format!("expected '/' after 'm' in '{trimmed}'"))
    })?;

    rest.split('/')
        .map(|segment| {
            let (digits, hardened) = match segment
                .strip_suffix('\'')
                .or_else(|| segment.strip_suffix('h'))
                .or_else(|| segment.strip_suffix('H'))
            {
                Some(d) => (d, true),
                None => (segment, false),
            };
            let index: u32 = digits.parse().map_err(|_| {
                WalletError::InvalidInput(format!("path segment '{segment}' is not an index"))
            })?;
            if index >= HARDENED_OFFSET {
                return Err(WalletError::InvalidInput(format!(
                    "path index {index} exceeds 2^31 - 1"
                )));
            }
            Ok(if hardened {
                index | HARDENED_OFFSET
            } else {
                index
            })
        })
        .collect()
}

/// Renders raw indices back to the canonical `'`-marked string form.
pub fn format_path(segments: &[u32]) -> String {
    let mut out = String::from("m");
    for &segment in segments {
        if segment >= HARDENED_OFFSET {
            out.push_str(&format!("/{}'", segment - HARDENED_OFFSET));
        } else {
            out.push_str(&format!("/{segment}"));
        }
    }
    out
}

fn scalar_from_bytes(bytes: &[u8; 32]) -> Option<Scalar> {
    let scalar = Option::<Scalar>::from(Scalar::from_repr((*bytes).into()))?;
    if bool::from(scalar.is_zero()) {
        None
    } else {
        Some(scalar)
    }
}

/// A BIP-32 extended private key.
pub struct ExtendedKey {
    key: [u8; 32],
    chain_code: [u8; 32],
    depth: u8,
    path: String,
    destroyed: bool,
}

impl ExtendedKey {
    /// Master key: HMAC-SHA512 of the seed under "Bitcoin seed".
    pub fn master_from_seed(seed: &[u8]) -> Result<Self, WalletError> {
        if seed.len() < 16 || seed.len() > 64 {
            return Err(WalletError::InvalidInput(format!(
                "seed must be 16..=64 bytes, got {}",
                seed.len()
            )));
        }
        let i = hmac_sha512(b"Bitcoin seed", seed)?;
        let mut key = [0u8; 32];
        let mut chain_code = [0u8; 32];
        key.copy_from_slice(&i[..32]);
        chain_code.copy_from_slice(&i[32..]);

        if scalar_from_bytes(&key).is_none() {
            return Err(WalletError::DerivationInvalid(
                "master key scalar out of range".into(),
            ));
        }
        Ok(Self {
            key,
            chain_code,
            depth: 0,
            path: "m".to_string(),
            destroyed: false,
        })
    }

    fn ensure_alive(&self) -> Result<(), WalletError> {
        if self.destroyed {
            Err(WalletError::Destroyed)
        } else {
            Ok(())
        }
    }

    fn key_scalar(&self) -> Result<Scalar, WalletError> {
        scalar_from_bytes(&self.key)
            .ok_or_else(|| WalletError::DerivationFailed("stored scalar out of range".into()))
    }

    /// One CKD step.
    pub fn derive_child(&self, index: u32) -> Result<Self, WalletError> {
        self.ensure_alive()?;
        let hardened = index >= HARDENED_OFFSET;

        let mut data = Vec::with_capacity(37);
        if hardened {
            data.push(0x00);
            data.extend_from_slice(&self.key);
        } else {
            data.extend_from_slice(&self.public_key(true)?);
        }
        data.extend_from_slice(&index.to_be_bytes());

        let i = hmac_sha512(&self.chain_code, &data)?;
        data.zeroize();

        let mut il = [0u8; 32];
        let mut chain_code = [0u8; 32];
        il.copy_from_slice(&i[..32]);
        chain_code.copy_from_slice(&i[32..]);

        let tweak =
            Option::<Scalar>::from(Scalar::from_repr(il.into())).ok_or_else(|| {
                WalletError::DerivationInvalid(format!("I_L >= n at index {index}"))
            })?;
        il.zeroize();

        let child_scalar = tweak + self.key_scalar()?;
        if bool::from(child_scalar.is_zero()) {
            return Err(WalletError::DerivationInvalid(format!(
                "zero child scalar at index {index}"
            )));
        }

        let path = if hardened {
            format!("{}/{}'", self.path, index - HARDENED_OFFSET)
        } else {
            format!("{}/{}", self.path, index)
        };

        Ok(Self {
            key: child_scalar.to_bytes().into(),
            chain_code,
            depth: self.depth + 1,
            path,
            destroyed: false,
        })
    }

    /// Derives along `segments`; intermediates are wiped as they drop.
    pub fn derive_path(&self, segments: &[u32]) -> Result<Self, WalletError> {
        self.ensure_alive()?;
        let mut current = self.derive_self()?;
        for &index in segments {
            current = current.derive_child(index)?;
        }
        Ok(current)
    }

    fn derive_self(&self) -> Result<Self, WalletError> {
        Ok(Self {
            key: self.key,
            chain_code: self.chain_code,
            depth: self.depth,
            path: self.path.clone(),
            destroyed: false,
        })
    }

    /// Copy of the private scalar.
    pub fn private_key(&self) -> Result<[u8; 32], WalletError> {
        self.ensure_alive()?;
        Ok(self.key)
    }

    /// Copy of the chain code.
    pub fn chain_code(&self) -> Result<[u8; 32], WalletError> {
        self.ensure_alive()?;
        Ok(self.chain_code)
    }

    /// SEC1 public key for the stored scalar.
    pub fn public_key(&self, compressed: bool) -> Result<Vec<u8>, WalletError> {
        self.ensure_alive()?;
        let point = ProjectivePoint::GENERATOR * self.key_scalar()?;
        Ok(point.to_affine().to_encoded_point(compressed).as_bytes().to_vec())
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Wipes the key material in place. Safe to call more than once.
    pub fn destroy(&mut self) {
        self.key.zeroize();
        self.chain_code.zeroize();
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl Drop for ExtendedKey {
    fn drop(&mut self) {
        self.key.zeroize();
        self.chain_code.zeroize();
    }
}

/// Master-from-seed plus path derivation in one call.
pub fn derive_from_seed(seed: &[u8], path: &str) -> Result<ExtendedKey, WalletError> {
    let segments = parse_path(path)?;
    let master = ExtendedKey::master_from_seed(seed)?;
    master.derive_path(&segments)
}
