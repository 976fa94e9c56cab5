//! Cryptographic error types for `enpass-crypto-core`.

use thiserror::Error;

/// Errors produced by cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key derivation could not run (empty password, bad salt, zero iterations).
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// The vault declares an algorithm this crate does not implement.
    ///
    /// Never recovered from: a different algorithm would produce a key the
    /// vault cannot be opened with.
    #[error("unsupported {kind} algorithm: expected {expected:?}, found {found:?}")]
    AlgorithmMismatch {
        /// Which algorithm slot mismatched (`"key derivation"` or `"database encryption"`).
        kind: &'static str,
        /// The identifier this crate implements.
        expected: &'static str,
        /// The identifier the vault declared.
        found: String,
    },

    /// Symmetric encryption failure (AES-256-GCM setup or sealing).
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Authentication tag verification failed: ciphertext tampered, wrong key,
    /// wrong nonce, or wrong AAD.
    #[error("decryption failed: authentication tag mismatch")]
    Decryption,

    /// Item key material carries no nonce: the item was deleted and its
    /// secret material cleared.
    #[error("item key material has been cleared")]
    Tombstoned,

    /// Invalid key material (wrong length, corrupted bytes).
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),
}
