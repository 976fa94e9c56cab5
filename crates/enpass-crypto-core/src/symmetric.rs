//! AES-256-GCM for per-item secret values.
//!
//! Each item field stores its own key material, `key (32 bytes) || nonce
//! (12 bytes)`, next to a hex ciphertext whose last 16 bytes are the GCM tag.
//! The item UUID is bound in as additional authenticated data, so a value
//! copied onto another item fails authentication.
//!
//! This module provides:
//! - [`ItemKey`]: parsed key material, or [`CryptoError::Tombstoned`] for cleared items
//! - [`open`]: authenticate and decrypt `ciphertext || tag`
//! - [`seal`]: the inverse, for building fixtures

use crate::error::CryptoError;
use crate::memory::{SecretBuffer, SecretBytes};
use ring::aead;
use std::fmt;
use zeroize::Zeroize;

/// AES-256-GCM key length in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// AES-256-GCM nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// AES-256-GCM authentication tag length in bytes (128 bits).
pub const TAG_LEN: usize = 16;

/// Length of stored item key material: key followed by nonce.
pub const ITEM_KEY_LEN: usize = 44;

// ---------------------------------------------------------------------------
// ItemKey
// ---------------------------------------------------------------------------

/// Per-item AES key and GCM nonce.
pub struct ItemKey {
    key: SecretBytes<KEY_LEN>,
    nonce: [u8; NONCE_LEN],
}

impl ItemKey {
    /// Split stored key material into key and nonce.
    ///
    /// Deleted items keep their row but have the material cleared, which
    /// leaves no nonce behind the first 32 bytes.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::Tombstoned`] if there are no bytes past the key
    /// - [`CryptoError::InvalidKeyMaterial`] for any length other than 44
    pub fn parse(material: &[u8]) -> Result<Self, CryptoError> {
        if material.len() <= KEY_LEN {
            return Err(CryptoError::Tombstoned);
        }
        if material.len() != ITEM_KEY_LEN {
            return Err(CryptoError::InvalidKeyMaterial(format!(
                "item key material must be {ITEM_KEY_LEN} bytes, got {}",
                material.len()
            )));
        }

        let (key, nonce) = material.split_at(KEY_LEN);
        let mut nonce_arr = [0u8; NONCE_LEN];
        nonce_arr.copy_from_slice(nonce);
        Ok(Self {
            key: SecretBytes::from_slice(key)?,
            nonce: nonce_arr,
        })
    }

    /// The 32-byte AES key.
    #[must_use]
    pub const fn key(&self) -> &SecretBytes<KEY_LEN> {
        &self.key
    }

    /// The 12-byte GCM nonce.
    #[must_use]
    pub const fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    /// Authenticate and decrypt `ciphertext_and_tag` with this key.
    ///
    /// # Errors
    ///
    /// See [`open`].
    pub fn open(
        &self,
        ciphertext_and_tag: &[u8],
        aad: &[u8],
    ) -> Result<SecretBuffer, CryptoError> {
        open(self.key.expose(), &self.nonce, ciphertext_and_tag, aad)
    }
}

impl fmt::Debug for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ItemKey(***)")
    }
}

// ---------------------------------------------------------------------------
// AEAD
// ---------------------------------------------------------------------------

fn gcm_key(key: &[u8]) -> Result<aead::LessSafeKey, CryptoError> {
    if key.len() != KEY_LEN {
        return Err(CryptoError::Encryption(format!(
            "invalid key length: {} bytes (expected {KEY_LEN})",
            key.len()
        )));
    }
    let unbound = aead::UnboundKey::new(&aead::AES_256_GCM, key)
        .map_err(|_| CryptoError::Encryption("failed to create AES-256-GCM key".into()))?;
    Ok(aead::LessSafeKey::new(unbound))
}

/// Decrypt AES-256-GCM `ciphertext || tag`.
///
/// The working buffer is zeroized once the plaintext has been copied into
/// the returned [`SecretBuffer`]; on failure nothing is returned.
///
/// # Errors
///
/// - [`CryptoError::Encryption`] if the key is not 32 bytes
/// - [`CryptoError::Decryption`] if the input is shorter than a tag or
///   authentication fails (tampered data, wrong key, nonce, or AAD)
pub fn open(
    key: &[u8],
    nonce: &[u8; NONCE_LEN],
    ciphertext_and_tag: &[u8],
    aad: &[u8],
) -> Result<SecretBuffer, CryptoError> {
    let gcm = gcm_key(key)?;
    if ciphertext_and_tag.len() < TAG_LEN {
        return Err(CryptoError::Decryption);
    }

    let mut in_out = ciphertext_and_tag.to_vec();
    let result = gcm
        .open_in_place(
            aead::Nonce::assume_unique_for_key(*nonce),
            aead::Aad::from(aad),
            &mut in_out,
        )
        .map(|plaintext| SecretBuffer::new(plaintext))
        .map_err(|_| CryptoError::Decryption);

    in_out.zeroize();
    result
}

/// Encrypt `plaintext` with AES-256-GCM, returning `ciphertext || tag`.
///
/// The nonce is supplied by the caller because item key material stores it
/// alongside the key.
///
/// # Errors
///
/// Returns [`CryptoError::Encryption`] if the key is not 32 bytes or sealing
/// fails.
pub fn seal(
    plaintext: &[u8],
    key: &[u8],
    nonce: &[u8; NONCE_LEN],
    aad: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let gcm = gcm_key(key)?;
    let mut in_out = plaintext.to_vec();
    gcm.seal_in_place_append_tag(
        aead::Nonce::assume_unique_for_key(*nonce),
        aead::Aad::from(aad),
        &mut in_out,
    )
    .map_err(|_| CryptoError::Encryption("AES-256-GCM encryption failed".into()))?;
    Ok(in_out)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
