//! Stateless hash functions used across the chain crates.
//!
//! Every function allocates a fresh output; nothing here holds state between
//! calls. Keccak-256 is the pre-NIST (Ethereum) padding variant, not
//! SHA3-256.

use blake2::digest::{Update as Blake2Update, VariableOutput};
use blake2::Blake2bVar;
use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};
use sha3::Keccak256;

use crate::error::CryptoError;

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

/// SHA-256.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Double SHA-256, as used by Bitcoin txids and Base58Check checksums.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    Sha256::digest(Sha256::digest(data)).into()
}

/// Keccak-256 (Ethereum variant).
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// RIPEMD-160.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(data).into()
}

/// HASH160: RIPEMD-160(SHA-256(data)).
pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(Sha256::digest(data)).into()
}

/// Blake2b with a caller-chosen digest length of 1..=64 bytes.
pub fn blake2b(data: &[u8], digest_len: usize) -> Result<Vec<u8>, CryptoError> {
    let mut hasher = Blake2bVar::new(digest_len)
        .map_err(|_| CryptoError::InvalidInput(format!("blake2b digest length {digest_len}")))?;
    hasher.update(data);
    let mut out = vec![0u8; digest_len];
    hasher
        .finalize_variable(&mut out)
        .map_err(|_| CryptoError::InvalidInput(format!("blake2b digest length {digest_len}")))?;
    Ok(out)
}

/// HMAC-SHA-256.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<[u8; 32], CryptoError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| CryptoError::InvalidInput(e.to_string()))?;
    Mac::update(&mut mac, data);
    Ok(mac.finalize().into_bytes().into())
}

/// HMAC-SHA-512.
pub fn hmac_sha512(key: &[u8], data: &[u8]) -> Result<[u8; 64], CryptoError> {
    let mut mac = HmacSha512::new_from_slice(key)
        .map_err(|e| CryptoError::InvalidInput(e.to_string()))?;
    Mac::update(&mut mac, data);
    Ok(mac.finalize().into_bytes().into())
}

/// BIP-340 tagged hash: SHA-256(SHA-256(tag) || SHA-256(tag) || msg).
pub fn tagged_hash(tag: &str, msg: &[u8]) -> [u8; 32] {
    let tag_hash = Sha256::digest(tag.as_bytes());
    let mut hasher = Sha256::new();
    Digest::update(&mut hasher, tag_hash);
    Digest::update(&mut hasher, tag_hash);
    Digest::update(&mut hasher, msg);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_empty() {
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_abc() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sha256d_empty() {
        assert_eq!(
            hex::encode(sha256d(b"")),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }

    #[test]
    fn keccak256_empty() {
        // Keccak, not SHA3: the empty digest differs from SHA3-256.
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn ripemd160_vectors() {
        assert_eq!(
            hex::encode(ripemd160(b"")),
            "9c1185a5c5e9fc54612808977ee8f548b2258d31"
        );
        assert_eq!(
            hex::encode(ripemd160(b"abc")),
            "8eb208f7e05d987a9b044a8e98c6b087f15a0bfc"
        );
    }

    #[test]
    fn hash160_of_generator_pubkey() {
        // Compressed public key for the secp256k1 scalar 1.
        let pubkey = hex::decode(
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
        )
        .unwrap();
        assert_eq!(
            hex::encode(hash160(&pubkey)),
            "751e76e8199196d454941c45d1b3a323f1433bd6"
        );
    }

    #[test]
    fn blake2b_empty_64() {
        assert_eq!(
            hex::encode(blake2b(b"", 64).unwrap()),
            "786a02f742015903c6c6fd852552d272912f4740e15847618a86e217f71f5419\
             d25e1031afee585313896444934eb04b903a685b1448b755d56f701afe9be2ce"
        );
    }

    #[test]
    fn blake2b_variable_lengths() {
        assert_eq!(blake2b(b"abc", 20).unwrap().len(), 20);
        assert_eq!(blake2b(b"abc", 32).unwrap().len(), 32);
        assert_ne!(
            blake2b(b"abc", 32).unwrap(),
            blake2b(b"abd", 32).unwrap()
        );
    }

    #[test]
    fn blake2b_rejects_bad_lengths() {
        assert!(blake2b(b"abc", 0).is_err());
        assert!(blake2b(b"abc", 65).is_err());
    }

    #[test]
    fn hmac_rfc4231_case1() {
        let key = [0x0bu8; 20];
        let data = b"Hi There";
        assert_eq!(
            hex::encode(hmac_sha256(&key, data).unwrap()),
            "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7"
        );
        assert_eq!(
            hex::encode(hmac_sha512(&key, data).unwrap()),
            "87aa7cdea5ef619d4ff0b4241a1d6cb02379f4e2ce4ec2787ad0b30545e17cde\
             daa833b7d6b8a702038b274eaea3f4e4be9d914eeb61f1702e696c203a126854"
        );
    }

    #[test]
    fn hmac_accepts_empty_key() {
        assert!(hmac_sha512(&[], b"data").is_ok());
    }

    #[test]
    fn tagged_hash_differs_from_plain() {
        let msg = [7u8; 32];
        assert_ne!(tagged_hash("TapTweak", &msg), sha256(&msg));
        // Deterministic in both tag and message.
        assert_eq!(tagged_hash("TapTweak", &msg), tagged_hash("TapTweak", &msg));
        assert_ne!(tagged_hash("TapTweak", &msg), tagged_hash("TapLeaf", &msg));
    }
}
