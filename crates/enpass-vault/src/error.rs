//! Vault error types for `enpass-vault`.

use std::path::PathBuf;

use enpass_crypto_core::CryptoError;
use thiserror::Error;

/// Errors produced by vault operations.
///
/// Callers are expected to match on the variant; messages carry the file or
/// entry involved so they can be reported as-is.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Missing or inconsistent credentials: no password, an incomplete
    /// credential set, or a keyfile supplied when the vault has none (or the
    /// reverse). Raised before any cryptographic work.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The vault declares a key derivation or page cipher algorithm other
    /// than the one implemented. Never retried.
    #[error("algorithm mismatch: {0}")]
    AlgorithmMismatch(#[source] CryptoError),

    /// A vault file does not exist.
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A file exists but could not be read.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Data could not be parsed: vault info JSON, ciphertext hex, UUID,
    /// plaintext encoding, or a truncated database header.
    #[error("malformed {what}: {detail}")]
    Malformed {
        /// What was being parsed (`"vault info"`, `"entry value"`, ...).
        what: String,
        /// Description of the defect.
        detail: String,
    },

    /// The keyfile could not be decoded.
    #[error("invalid keyfile {}: {source}", path.display())]
    Keyfile {
        /// The keyfile path.
        path: PathBuf,
        /// Which decoding layer failed.
        #[source]
        source: KeyfileError,
    },

    /// Wrong password or key. At open time the store showed no item table
    /// (or refused to read as a database); at entry level the GCM tag did
    /// not verify.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The entry has been deleted and its key material cleared.
    #[error("entry {uuid} has been deleted")]
    EntryDeleted {
        /// The tombstoned entry.
        uuid: String,
    },

    /// No entry matched the query.
    #[error("entry not found")]
    EntryNotFound,

    /// A unique lookup matched more than one entry.
    #[error("multiple entries match that query")]
    AmbiguousMatch,

    /// The vault is not open.
    #[error("vault is not open")]
    Locked,

    /// `SQLCipher` error other than a wrong key.
    #[error("database error: {0}")]
    Database(#[source] rusqlite::Error),

    /// Other cryptographic failure (invalid key material, cipher setup).
    #[error(transparent)]
    Crypto(CryptoError),
}

/// Decoding layers of a keyfile.
#[derive(Debug, Error)]
pub enum KeyfileError {
    /// The file is not well-formed XML.
    #[error("XML: {0}")]
    Xml(String),

    /// The key element is missing or empty.
    #[error("no key element")]
    Empty,

    /// The key text is not valid hex.
    #[error("hex: {0}")]
    Hex(#[source] data_encoding::DecodeError),
}

impl From<CryptoError> for VaultError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::AlgorithmMismatch { .. } => Self::AlgorithmMismatch(err),
            other => Self::Crypto(other),
        }
    }
}

impl From<rusqlite::Error> for VaultError {
    fn from(err: rusqlite::Error) -> Self {
        // SQLITE_NOTADB (code 26) is what SQLCipher reports for a wrong key.
        if let rusqlite::Error::SqliteFailure(ref ffi_err, _) = err {
            if ffi_err.code == rusqlite::ffi::ErrorCode::NotADatabase {
                return Self::AuthenticationFailed(
                    "database could not be decrypted with the derived key".into(),
                );
            }
        }
        Self::Database(err)
    }
}

impl VaultError {
    /// Build a [`VaultError::Io`], or [`VaultError::NotFound`] when the
    /// underlying error is `NotFound`.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Io { path, source }
        }
    }

    pub(crate) fn malformed(what: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Malformed {
            what: what.into(),
            detail: detail.into(),
        }
    }
}
