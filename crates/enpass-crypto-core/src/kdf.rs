//! PBKDF2-HMAC-SHA512 derivation of the vault database key.
//!
//! This module provides:
//! - [`ensure_supported`]: reject vaults declaring algorithms we do not implement
//! - [`derive_database_key`]: stretch `password || keyfile` over the database salt
//!
//! The vault's `vault.json` names the algorithms in use. Only the pair
//! ([`KDF_ALGORITHM`], [`CIPHER_ALGORITHM`]) is accepted; anything else is a
//! hard failure.

use crate::error::CryptoError;
use crate::memory::SecretBytes;
use zeroize::Zeroize;

/// Key derivation algorithm identifier implemented here.
pub const KDF_ALGORITHM: &str = "pbkdf2";

/// Database page cipher identifier implemented here.
pub const CIPHER_ALGORITHM: &str = "aes-256-cbc";

/// Length of the salt stored at the start of the database file.
pub const SALT_LEN: usize = 16;

/// Output length of the derivation (SHA-512 digest size).
pub const DERIVED_KEY_LEN: usize = 64;

/// Check the algorithm identifiers declared by a vault.
///
/// # Errors
///
/// Returns [`CryptoError::AlgorithmMismatch`] naming the first identifier that
/// differs from [`KDF_ALGORITHM`] / [`CIPHER_ALGORITHM`].
pub fn ensure_supported(kdf_algo: &str, cipher_algo: &str) -> Result<(), CryptoError> {
    if kdf_algo != KDF_ALGORITHM {
        return Err(CryptoError::AlgorithmMismatch {
            kind: "key derivation",
            expected: KDF_ALGORITHM,
            found: kdf_algo.to_string(),
        });
    }
    if cipher_algo != CIPHER_ALGORITHM {
        return Err(CryptoError::AlgorithmMismatch {
            kind: "database encryption",
            expected: CIPHER_ALGORITHM,
            found: cipher_algo.to_string(),
        });
    }
    Ok(())
}

/// Derive the 64-byte database key with PBKDF2-HMAC-SHA512.
///
/// `password` is the master password with the keyfile key (if any) already
/// appended. The result is deterministic for a given input triple.
///
/// # Errors
///
/// Returns [`CryptoError::KeyDerivation`] if:
/// - `password` is empty
/// - `salt` is not exactly [`SALT_LEN`] bytes
/// - `iterations` is zero
pub fn derive_database_key(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<SecretBytes<DERIVED_KEY_LEN>, CryptoError> {
    if password.is_empty() {
        return Err(CryptoError::KeyDerivation("empty master password".into()));
    }
    if salt.len() != SALT_LEN {
        return Err(CryptoError::KeyDerivation(format!(
            "salt must be {SALT_LEN} bytes, got {}",
            salt.len()
        )));
    }
    if iterations == 0 {
        return Err(CryptoError::KeyDerivation(
            "iteration count must be positive".into(),
        ));
    }

    let mut output = [0u8; DERIVED_KEY_LEN];
    pbkdf2::pbkdf2_hmac::<sha2::Sha512>(password, salt, iterations, &mut output);

    let key = SecretBytes::new(output);
    output.zeroize();
    Ok(key)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
