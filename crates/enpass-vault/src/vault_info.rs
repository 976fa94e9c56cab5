//! `vault.json`, the side-file that parameterizes key derivation.
//!
//! It names the KDF and page cipher, the iteration count, and whether a
//! keyfile takes part in unlocking. It is the only source for those values;
//! [`VaultInfo::ensure_supported_algorithms`] must pass before a key is
//! derived.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::VaultError;

/// Vault info file name.
pub const VAULT_INFO_FILE: &str = "vault.json";

/// Parsed contents of `vault.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultInfo {
    /// Page cipher of the database, expected `"aes-256-cbc"`.
    #[serde(rename = "encryption_algo")]
    pub encryption_algorithm: String,
    /// Key derivation function, expected `"pbkdf2"`.
    #[serde(rename = "kdf_algo")]
    pub kdf_algorithm: String,
    /// PBKDF2 iteration count.
    #[serde(rename = "kdf_iter")]
    pub kdf_iterations: u32,
    /// Whether a keyfile is required (`1`) or not (`0`).
    #[serde(rename = "have_keyfile", default)]
    pub has_keyfile: u8,
    /// Declared number of items.
    #[serde(rename = "vault_items_count")]
    pub item_count: u64,
    /// Display name of the vault.
    pub vault_name: String,
    /// Vault format version.
    pub version: u32,
}

impl VaultInfo {
    /// Read and parse `vault.json` from `vault_dir`.
    ///
    /// # Errors
    ///
    /// - [`VaultError::NotFound`] if the file does not exist
    /// - [`VaultError::Io`] if it cannot be read
    /// - [`VaultError::Malformed`] if the JSON does not fit or the iteration
    ///   count is zero
    pub fn load(vault_dir: &Path) -> Result<Self, VaultError> {
        let path = vault_dir.join(VAULT_INFO_FILE);
        let bytes = std::fs::read(&path).map_err(|e| VaultError::io(&path, e))?;
        let info = Self::from_json(&bytes)?;

        tracing::debug!(
            vault_name = %info.vault_name,
            vault_version = info.version,
            "vault info loaded"
        );
        Ok(info)
    }

    /// Parse vault info from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Malformed`] if the JSON does not fit or the
    /// iteration count is zero.
    pub fn from_json(bytes: &[u8]) -> Result<Self, VaultError> {
        let info: Self = serde_json::from_slice(bytes)
            .map_err(|e| VaultError::malformed("vault info", e.to_string()))?;
        if info.kdf_iterations == 0 {
            return Err(VaultError::malformed(
                "vault info",
                "kdf_iter must be positive",
            ));
        }
        Ok(info)
    }

    /// Fail unless the declared algorithms are exactly the implemented ones.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::AlgorithmMismatch`] on any difference.
    pub fn ensure_supported_algorithms(&self) -> Result<(), VaultError> {
        enpass_crypto_core::ensure_supported(&self.kdf_algorithm, &self.encryption_algorithm)?;
        Ok(())
    }

    /// Whether unlocking requires a keyfile.
    #[must_use]
    pub const fn requires_keyfile(&self) -> bool {
        self.has_keyfile != 0
    }
}
