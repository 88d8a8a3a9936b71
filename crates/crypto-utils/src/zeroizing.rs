use std::ops::Deref;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// A `Vec<u8>` wrapper that is zeroed when dropped.
///
/// Holds anything key-shaped (seeds, scalars, chain codes) that must not
/// linger in memory after use. Construction copies the input; `to_vec`
/// returns a fresh copy the caller is responsible for.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes(Vec<u8>);

impl SecretBytes {
    pub fn new(data: Vec<u8>) -> Self {
        Self(data)
    }

    /// Copies the secret out. The copy is the caller's to wipe.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.clone()
    }

    /// Copies the secret into a fixed-size array, failing on length
    /// mismatch.
    pub fn to_array<const N: usize>(&self) -> Result<[u8; N], crate::error::CryptoError> {
        self.0.as_slice().try_into().map_err(|_| {
            crate::error::CryptoError::InvalidInput(format!(
                "expected {N} bytes, got {}",
                self.0.len()
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Wipes the buffer in place. Idempotent.
    pub fn wipe(&mut self) {
        self.0.zeroize();
    }
}

impl Deref for SecretBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for SecretBytes {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for SecretBytes {
    fn from(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }
}

/// A `String` wrapper that is zeroed when dropped (mnemonics, passphrases).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(data: String) -> Self {
        Self(data)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for SecretString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl From<String> for SecretString {
    fn from(data: String) -> Self {
        Self::new(data)
    }
}

impl From<&str> for SecretString {
    fn from(data: &str) -> Self {
        Self::new(data.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_bytes_deref_and_copy() {
        let data = vec![1u8, 2, 3, 4, 5];
        let sb = SecretBytes::new(data.clone());
        assert_eq!(&*sb, &data[..]);
        assert_eq!(sb.to_vec(), data);
    }

    #[test]
    fn secret_bytes_to_array() {
        let sb = SecretBytes::new(vec![7u8; 32]);
        let arr: [u8; 32] = sb.to_array().unwrap();
        assert_eq!(arr, [7u8; 32]);
        assert!(sb.to_array::<16>().is_err());
    }

    #[test]
    fn secret_bytes_wipe() {
        let mut sb = SecretBytes::new(vec![0xAA; 8]);
        sb.wipe();
        assert!(sb.iter().all(|&b| b == 0));
        sb.wipe();
    }

    #[test]
    fn secret_bytes_len_and_is_empty() {
        let sb = SecretBytes::new(vec![10, 20]);
        assert_eq!(sb.len(), 2);
        assert!(!sb.is_empty());
        assert!(SecretBytes::new(vec![]).is_empty());
    }

    #[test]
    fn secret_string_deref() {
        let ss = SecretString::from("correct horse battery staple");
        assert_eq!(&*ss, "correct horse battery staple");
        assert_eq!(ss.len(), 28);
        assert!(!ss.is_empty());
    }
}
