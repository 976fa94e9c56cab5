//! Secret memory types for passwords and key material.
//!
//! Every value here is zeroed when dropped and prints as `***` in
//! `Debug`/`Display`, so key material can be held for a whole vault session
//! and released on every exit path, error paths included.

use crate::error::CryptoError;
use secrecy::{ExposeSecret, SecretSlice};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ---------------------------------------------------------------------------
// SecretBuffer (variable length)
// ---------------------------------------------------------------------------

/// Variable-length buffer for sensitive data (master passwords, keyfile
/// bytes, decrypted entry values).
///
/// Wraps [`SecretSlice<u8>`], which zeroizes its allocation on drop.
pub struct SecretBuffer {
    inner: SecretSlice<u8>,
}

impl SecretBuffer {
    /// Copy `data` into a new secret allocation.
    ///
    /// The caller remains responsible for wiping its own copy.
    #[must_use]
    pub fn new(data: &[u8]) -> Self {
        Self {
            inner: data.to_vec().into(),
        }
    }

    /// Take ownership of `data`, wiping the source vector once copied.
    ///
    /// The spare capacity of `data` is zeroized too.
    #[must_use]
    pub fn from_vec(mut data: Vec<u8>) -> Self {
        let buf = Self::new(&data);
        data.zeroize();
        buf
    }

    /// Concatenate several byte strings into one secret buffer.
    ///
    /// Used to build the key derivation input (`password || keyfile key`)
    /// without leaving an unwiped intermediate allocation.
    #[must_use]
    pub fn concat(parts: &[&[u8]]) -> Self {
        let total = parts
            .iter()
            .map(|p| p.len())
            .fold(0usize, usize::saturating_add);
        let mut joined = Vec::with_capacity(total);
        for part in parts {
            joined.extend_from_slice(part);
        }
        Self::from_vec(joined)
    }

    /// Expose the underlying bytes for a cryptographic operation.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    /// Returns the number of bytes in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.expose().len()
    }

    /// Returns `true` if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}

impl fmt::Display for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}

// ---------------------------------------------------------------------------
// SecretBytes<N> (fixed size)
// ---------------------------------------------------------------------------

/// Fixed-size secret: the 64-byte database key, 32-byte item keys.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> SecretBytes<N> {
    /// Wrap a fixed-size array. The array is moved in; no copy remains.
    #[must_use]
    pub const fn new(bytes: [u8; N]) -> Self {
        Self { bytes }
    }

    /// Copy exactly `N` bytes out of `slice`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyMaterial`] if `slice.len() != N`.
    pub fn from_slice(slice: &[u8]) -> Result<Self, CryptoError> {
        if slice.len() != N {
            return Err(CryptoError::InvalidKeyMaterial(format!(
                "expected {N} bytes, got {}",
                slice.len()
            )));
        }
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(slice);
        Ok(Self::new(bytes))
    }

    /// Expose the underlying bytes for a cryptographic operation.
    #[must_use]
    pub const fn expose(&self) -> &[u8; N] {
        &self.bytes
    }

    /// Zero the bytes now instead of waiting for the drop.
    pub fn wipe(&mut self) {
        self.bytes.zeroize();
    }
}

impl<const N: usize> fmt::Debug for SecretBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes<{N}>(***)")
    }
}

impl<const N: usize> fmt::Display for SecretBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes<{N}>(***)")
    }
}

impl<const N: usize> From<[u8; N]> for SecretBytes<N> {
    fn from(bytes: [u8; N]) -> Self {
        Self::new(bytes)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_buffer_new_stores_content() {
        let buf = SecretBuffer::new(b"master password");
        assert_eq!(buf.expose(), b"master password");
        assert_eq!(buf.len(), 15);
        assert!(!buf.is_empty());
    }

    #[test]
    fn secret_buffer_empty() {
        let buf = SecretBuffer::new(b"");
        assert!(buf.is_empty());
    }

    #[test]
    fn secret_buffer_from_vec_keeps_bytes() {
        let buf = SecretBuffer::from_vec(vec![1, 2, 3]);
        assert_eq!(buf.expose(), &[1, 2, 3]);
    }

    #[test]
    fn concat_appends_in_order() {
        let buf = SecretBuffer::concat(&[b"pass", &[0x00, 0xFF], b""]);
        assert_eq!(buf.expose(), b"pass\x00\xff");
    }

    #[test]
    fn concat_of_nothing_is_empty() {
        assert!(SecretBuffer::concat(&[]).is_empty());
    }

    #[test]
    fn secret_buffer_debug_and_display_are_masked() {
        let buf = SecretBuffer::new(b"super secret");
        assert_eq!(format!("{buf:?}"), "SecretBuffer(***)");
        assert_eq!(format!("{buf}"), "SecretBuffer(***)");
    }

    #[test]
    fn secret_bytes_from_slice_checks_length() {
        assert!(SecretBytes::<32>::from_slice(&[0u8; 32]).is_ok());
        let err = SecretBytes::<32>::from_slice(&[0u8; 31]).expect_err("short slice");
        assert!(matches!(err, CryptoError::InvalidKeyMaterial(_)));
        assert!(SecretBytes::<32>::from_slice(&[0u8; 33]).is_err());
    }

    #[test]
    fn secret_bytes_wipe_zeroes() {
        let mut key = SecretBytes::new([0xAB; 64]);
        key.wipe();
        assert_eq!(key.expose(), &[0u8; 64]);
    }

    #[test]
    fn secret_bytes_debug_is_masked() {
        let key = SecretBytes::<64>::new([0xFF; 64]);
        let debug = format!("{key:?}");
        assert_eq!(debug, "SecretBytes<64>(***)");
        assert!(!debug.contains("ff"));
    }

    #[test]
    fn secret_bytes_from_array() {
        let key: SecretBytes<16> = [0x42; 16].into();
        assert_eq!(key.expose(), &[0x42; 16]);
    }
}
