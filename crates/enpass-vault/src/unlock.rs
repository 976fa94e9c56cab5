//! From credentials to the 64-byte database key.
//!
//! `password || keyfile key` is stretched with PBKDF2-HMAC-SHA512 over the
//! salt stored in the first 16 bytes of `vault.enpassdb`, using the iteration
//! count from `vault.json`.

use std::io::Read;
use std::path::Path;

use enpass_crypto_core::kdf::{self, DERIVED_KEY_LEN, SALT_LEN};
use enpass_crypto_core::{SecretBuffer, SecretBytes};

use crate::credentials::Credentials;
use crate::error::VaultError;
use crate::keyfile::load_keyfile;
use crate::vault_info::VaultInfo;

/// Read the KDF salt from the head of the database file.
///
/// Only the first [`SALT_LEN`] bytes are read; the file is opened read-only.
///
/// # Errors
///
/// - [`VaultError::NotFound`] / [`VaultError::Io`] if the file cannot be read
/// - [`VaultError::Malformed`] if it is shorter than the salt
pub fn extract_salt(db_path: &Path) -> Result<[u8; SALT_LEN], VaultError> {
    let mut file = std::fs::File::open(db_path).map_err(|e| VaultError::io(db_path, e))?;
    let mut salt = [0u8; SALT_LEN];
    file.read_exact(&mut salt).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            VaultError::malformed(
                "database header",
                format!("{} is shorter than {SALT_LEN} bytes", db_path.display()),
            )
        } else {
            VaultError::io(db_path, e)
        }
    })?;
    Ok(salt)
}

/// Build the derivation input: password bytes, then keyfile bytes if any.
///
/// # Errors
///
/// - [`VaultError::Configuration`] if the password is empty
/// - keyfile errors from [`load_keyfile`]
pub fn master_password(
    password: &str,
    keyfile: Option<&Path>,
) -> Result<SecretBuffer, VaultError> {
    if password.is_empty() {
        return Err(VaultError::Configuration(
            "empty master password provided".into(),
        ));
    }

    match keyfile {
        None => {
            tracing::debug!("not using keyfile");
            Ok(SecretBuffer::new(password.as_bytes()))
        }
        Some(path) => {
            tracing::debug!(keyfile = %path.display(), "using keyfile");
            let key = load_keyfile(path)?;
            Ok(SecretBuffer::concat(&[password.as_bytes(), key.expose()]))
        }
    }
}

/// Produce the database key for `credentials`.
///
/// A pre-derived key is returned as-is (after the algorithm check). Otherwise
/// the password and keyfile are validated against `info` before any
/// cryptographic work starts.
///
/// # Errors
///
/// - [`VaultError::Configuration`] for a missing password or a keyfile
///   presence mismatch
/// - [`VaultError::AlgorithmMismatch`] if `info` declares other algorithms
/// - I/O, keyfile, and salt errors from the helpers above
pub fn derive_key(
    info: &VaultInfo,
    credentials: &mut Credentials,
    db_path: &Path,
) -> Result<SecretBytes<DERIVED_KEY_LEN>, VaultError> {
    info.ensure_supported_algorithms()?;

    if let Some(key) = credentials.take_database_key() {
        tracing::debug!("skipping database key generation, already set");
        return Ok(key);
    }

    let password = credentials
        .password()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| VaultError::Configuration("empty vault password provided".into()))?;

    match (credentials.keyfile().is_some(), info.requires_keyfile()) {
        (false, true) => {
            return Err(VaultError::Configuration(
                "this vault requires a keyfile".into(),
            ));
        }
        (true, false) => {
            return Err(VaultError::Configuration(
                "a keyfile was given but this vault does not use one".into(),
            ));
        }
        _ => {}
    }

    let input = master_password(password, credentials.keyfile())?;
    let salt = extract_salt(db_path)?;

    tracing::debug!(iterations = info.kdf_iterations, "deriving database key");
    Ok(kdf::derive_database_key(
        input.expose(),
        &salt,
        info.kdf_iterations,
    )?)
}
