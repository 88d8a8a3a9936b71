//! BIP-39 mnemonics: generation, entropy round-trips, validation, and seed
//! derivation.
//!
//! Word lookup is case-insensitive; phrases are normalized to lower case
//! before parsing, and the `bip39` crate applies NFKD and the
//! PBKDF2-HMAC-SHA512 seed computation (2048 iterations, 64-byte output).

use bip39::{Language, Mnemonic};
use rand::RngCore;
use zeroize::Zeroize;

use crate::error::WalletError;

/// Entropy sizes in bytes for the supported word counts.
fn entropy_len_for_word_count(word_count: usize) -> Result<usize, WalletError> {
    match word_count {
        12 => Ok(16),
        15 => Ok(20),
        18 => Ok(24),
        21 => Ok(28),
        24 => Ok(32),
        other => Err(WalletError::InvalidMnemonic(format!(
            "unsupported word count {other}"
        ))),
    }
}

fn parse(phrase: &str) -> Result<Mnemonic, WalletError> {
    let normalized = phrase.trim().to_lowercase();
    Mnemonic::parse_in_normalized(Language::English, &normalized)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))
}

/// Generates a fresh mnemonic of 12/15/18/21/24 words from OS entropy.
pub fn generate_mnemonic(word_count: usize) -> Result<String, WalletError> {
    let len = entropy_len_for_word_count(word_count)?;
    let mut entropy = vec![0u8; len];
    rand::rngs::OsRng.fill_bytes(&mut entropy);
    let result = mnemonic_from_entropy(&entropy);
    entropy.zeroize();
    result
}

/// Converts raw entropy (16/20/24/28/32 bytes) into its mnemonic.
pub fn mnemonic_from_entropy(entropy: &[u8]) -> Result<String, WalletError> {
    let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
    Ok(mnemonic.to_string())
}

/// Recovers the entropy a mnemonic encodes.
pub fn mnemonic_to_entropy(phrase: &str) -> Result<Vec<u8>, WalletError> {
    Ok(parse(phrase)?.to_entropy())
}

/// Checks word count, wordlist membership, and the checksum.
pub fn validate_mnemonic(phrase: &str) -> bool {
    parse(phrase).is_ok()
}

/// Derives the 64-byte seed. The caller must wipe the returned buffer.
pub fn mnemonic_to_seed(phrase: &str, passphrase: &str) -> Result<Vec<u8>, WalletError> {
    let mnemonic = parse(phrase)?;
    Ok(mnemonic.to_seed(passphrase).to_vec())
}

/// The embedded 2048-word English list.
pub fn word_list() -> &'static [&'static str] {
    Language::English.word_list()
}

/// Case-insensitive wordlist membership test.
pub fn is_valid_word(word: &str) -> bool {
    Language::English
        .find_word(&word.to_lowercase())
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn generate_all_word_counts() {
        for count in [12usize, 15, 18, 21, 24] {
            let phrase = generate_mnemonic(count).unwrap();
            assert_eq!(phrase.split_whitespace().count(), count);
            assert!(validate_mnemonic(&phrase));
        }
        assert!(generate_mnemonic(13).is_err());
    }

    #[test]
    fn entropy_roundtrip() {
        let entropy = [0x7fu8; 32];
        let phrase = mnemonic_from_entropy(&entropy).unwrap();
        assert_eq!(mnemonic_to_entropy(&phrase).unwrap(), entropy);
    }

    #[test]
    fn all_zero_entropy_is_the_abandon_vector() {
        let phrase = mnemonic_from_entropy(&[0u8; 16]).unwrap();
        assert_eq!(phrase, TEST_MNEMONIC);
        assert_eq!(mnemonic_to_entropy(TEST_MNEMONIC).unwrap(), vec![0u8; 16]);
    }

    #[test]
    fn validation_rejects_bad_phrases() {
        assert!(!validate_mnemonic("not a real mnemonic phrase at all"));
        // Right words, wrong checksum (last word swapped).
        assert!(!validate_mnemonic(
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon"
        ));
        // Wrong word count.
        assert!(!validate_mnemonic("abandon about"));
        assert!(!validate_mnemonic(""));
    }

    #[test]
    fn validation_is_case_insensitive() {
        assert!(validate_mnemonic(&TEST_MNEMONIC.to_uppercase()));
    }

    #[test]
    fn seed_matches_bip39_vector() {
        let seed = mnemonic_to_seed(TEST_MNEMONIC, "").unwrap();
        assert_eq!(
            hex::encode(&seed),
            "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc1\
             9a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4"
        );
    }

    #[test]
    fn passphrase_changes_seed() {
        let a = mnemonic_to_seed(TEST_MNEMONIC, "").unwrap();
        let b = mnemonic_to_seed(TEST_MNEMONIC, "TREZOR").unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert_eq!(b.len(), 64);
    }

    #[test]
    fn word_list_shape() {
        let words = word_list();
        assert_eq!(words.len(), 2048);
        assert_eq!(words[0], "abandon");
        assert_eq!(words[2047], "zoo");
    }

    #[test]
    fn word_lookup_is_case_insensitive() {
        assert!(is_valid_word("abandon"));
        assert!(is_valid_word("Abandon"));
        assert!(is_valid_word("ZOO"));
        assert!(!is_valid_word("notaword"));
        assert!(!is_valid_word(""));
    }
}
