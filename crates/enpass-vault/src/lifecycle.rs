//! Vault session: locate the vault files, unlock, query, close.
//!
//! A vault directory holds two files:
//!
//! - `vault.json`: KDF parameters, see [`VaultInfo`]
//! - `vault.enpassdb`: `SQLCipher` store whose first 16 bytes are the salt
//!
//! ```text
//! Vault::new(dir) ─► open(credentials) ─► entries / entry / secrets ─► close
//! ```
//!
//! Queries before `open` or after `close` fail with [`VaultError::Locked`].

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use enpass_crypto_core::{SecretBuffer, SecretBytes, DERIVED_KEY_LEN};

use crate::catalog::{self, EntryFilter};
use crate::credentials::Credentials;
use crate::db::VaultDb;
use crate::entries::Entry;
use crate::error::VaultError;
use crate::unlock;
use crate::vault_info::{VaultInfo, VAULT_INFO_FILE};

/// Encrypted database file name.
pub const DATABASE_FILE: &str = "vault.enpassdb";

// ---------------------------------------------------------------------------
// SecretRecord
// ---------------------------------------------------------------------------

/// One decrypted (or failed) item from [`Vault::secrets`].
///
/// Keys are unique within one call. When an item has several matching
/// fields, the record holds the last one in store order.
#[derive(Debug)]
pub struct SecretRecord {
    /// `"<uuid>/<title>"`.
    pub key: String,
    /// The plaintext, or why this entry could not be decrypted.
    pub value: Result<SecretBuffer, VaultError>,
}

// ---------------------------------------------------------------------------
// Vault
// ---------------------------------------------------------------------------

/// An Enpass vault directory and, once opened, its unlocked database.
pub struct Vault {
    dir: PathBuf,
    db_path: PathBuf,
    info: VaultInfo,
    key: Option<SecretBytes<DERIVED_KEY_LEN>>,
    db: Option<VaultDb>,
    span: tracing::Span,
}

impl Vault {
    /// Locate a vault and read its `vault.json`. Nothing is decrypted yet.
    ///
    /// Symlinks in `vault_dir` are resolved first.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Configuration`] if `vault_dir` is empty
    /// - [`VaultError::NotFound`] naming the directory, `vault.enpassdb`, or
    ///   `vault.json` if one is missing
    /// - [`VaultError::Malformed`] if `vault.json` cannot be parsed
    pub fn new(vault_dir: impl AsRef<Path>) -> Result<Self, VaultError> {
        let vault_dir = vault_dir.as_ref();
        if vault_dir.as_os_str().is_empty() {
            return Err(VaultError::Configuration("empty vault path provided".into()));
        }

        let dir = vault_dir
            .canonicalize()
            .map_err(|e| VaultError::io(vault_dir, e))?;

        let db_path = dir.join(DATABASE_FILE);
        std::fs::metadata(&db_path).map_err(|e| VaultError::io(&db_path, e))?;
        let info_path = dir.join(VAULT_INFO_FILE);
        std::fs::metadata(&info_path).map_err(|e| VaultError::io(&info_path, e))?;

        let span = tracing::info_span!(
            "vault",
            path = %dir.display(),
            vault_name = tracing::field::Empty
        );
        let info = span.in_scope(|| VaultInfo::load(&dir))?;
        span.record("vault_name", info.vault_name.as_str());

        Ok(Self {
            dir,
            db_path,
            info,
            key: None,
            db: None,
            span,
        })
    }

    /// Record diagnostics under `span` instead of the default `vault` span.
    ///
    /// Events from [`new`](Self::new) itself have already been recorded
    /// under the default span.
    #[must_use]
    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }

    /// Derive the database key and open the store.
    ///
    /// An already open vault is closed first. On failure the vault stays
    /// closed and any derived key is wiped.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Configuration`] for incomplete credentials or a
    ///   keyfile presence mismatch
    /// - [`VaultError::AlgorithmMismatch`] if `vault.json` names other
    ///   algorithms
    /// - [`VaultError::AuthenticationFailed`] for a wrong password, keyfile,
    ///   or pre-derived key
    /// - I/O, keyfile, and database errors
    pub fn open(&mut self, mut credentials: Credentials) -> Result<(), VaultError> {
        let span = self.span.clone();
        let _guard = span.enter();

        self.close();
        if !credentials.is_complete() {
            return Err(VaultError::Configuration(
                "a non-empty password or a database key is required".into(),
            ));
        }

        let key = unlock::derive_key(&self.info, &mut credentials, &self.db_path)?;
        let db = VaultDb::open(&self.db_path, &key)?;

        tracing::debug!(
            cipher_version = %db.cipher_version(),
            declared_items = self.info.item_count,
            "vault opened"
        );
        self.key = Some(key);
        self.db = Some(db);
        Ok(())
    }

    /// Entries passing `filter`, deleted ones excluded, in store order.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Locked`] if the vault is not open
    /// - [`VaultError::Database`] if reading rows fails
    pub fn entries(&self, filter: &EntryFilter) -> Result<Vec<Entry>, VaultError> {
        let _guard = self.span.enter();
        let db = self.db.as_ref().ok_or(VaultError::Locked)?;
        Ok(catalog::list(db.entries()?, filter))
    }

    /// The first non-trashed entry passing `filter`.
    ///
    /// # Errors
    ///
    /// - [`VaultError::EntryNotFound`] if there is none
    /// - [`VaultError::AmbiguousMatch`] if `unique` and there are several
    /// - errors from [`entries`](Self::entries)
    pub fn entry(&self, filter: &EntryFilter, unique: bool) -> Result<Entry, VaultError> {
        catalog::find_one(self.entries(filter)?, unique)
    }

    /// Decrypt every non-trashed entry passing `filter`, one record per
    /// `"<uuid>/<title>"` key in order of first appearance.
    ///
    /// A later field of the same item replaces the earlier value. Each
    /// record carries its own result, so a tombstoned or corrupt entry is
    /// reported without hiding the others.
    ///
    /// # Errors
    ///
    /// Only the errors of [`entries`](Self::entries); per-entry failures are
    /// inside the records.
    pub fn secrets(&self, filter: &EntryFilter) -> Result<Vec<SecretRecord>, VaultError> {
        let entries = self.entries(filter)?;
        let _guard = self.span.enter();

        let mut records: Vec<SecretRecord> = Vec::new();
        let mut slots: HashMap<String, usize> = HashMap::new();
        for e in entries.iter().filter(|e| !e.is_trashed()) {
            let value = e.decrypt();
            if let Err(ref err) = value {
                tracing::warn!(uuid = %e.uuid, error = %err, "could not decrypt entry");
            }
            let key = format!("{}/{}", e.uuid, e.title);
            match slots.get(&key).and_then(|&i| records.get_mut(i)) {
                Some(record) => record.value = value,
                None => {
                    slots.insert(key.clone(), records.len());
                    records.push(SecretRecord { key, value });
                }
            }
        }

        tracing::debug!(fields = entries.len(), count = records.len(), "secrets mapped");
        Ok(records)
    }

    /// Contents of `vault.json`.
    #[must_use]
    pub const fn info(&self) -> &VaultInfo {
        &self.info
    }

    /// The resolved vault directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of `vault.enpassdb`.
    #[must_use]
    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    /// Whether [`open`](Self::open) succeeded and [`close`](Self::close) has
    /// not been called since.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.db.is_some()
    }

    /// Close the store and wipe the derived key. Safe to call repeatedly,
    /// including on a vault that was never opened.
    pub fn close(&mut self) {
        let _guard = self.span.enter();
        if let Some(mut db) = self.db.take() {
            db.close();
        }
        if let Some(mut key) = self.key.take() {
            key.wipe();
            tracing::debug!("vault closed");
        }
    }
}

impl Drop for Vault {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Vault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vault")
            .field("dir", &self.dir)
            .field("vault_name", &self.info.vault_name)
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}
