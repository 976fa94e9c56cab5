//! `SQLCipher` connection to `vault.enpassdb`: raw key injection, wrong-key
//! detection, and the item/field row query.
//!
//! Enpass databases use SQLCipher 3 defaults. The page key is the low 32
//! bytes of the 64-byte PBKDF2 output, passed as a raw hex key so SQLCipher
//! runs no KDF of its own. The upper 32 bytes are never used.

use std::fmt;
use std::path::Path;

use enpass_crypto_core::{SecretBytes, DERIVED_KEY_LEN};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use zeroize::Zeroize;

use crate::entries::Entry;
use crate::error::VaultError;

/// Bytes of the derived key used as the SQLCipher page key.
pub const PAGE_KEY_LEN: usize = 32;

/// Table whose presence confirms the page key is right.
const SENTINEL_TABLE: &str = "item";

/// One row per item field, item columns repeated on every row.
const ENTRY_QUERY: &str = "\
    SELECT uuid, type, created_at, field_updated_at, title, \
           subtitle, note, trashed, item.deleted, category, \
           label, value, key, last_used, sensitive, item.icon \
    FROM item \
    INNER JOIN itemfield ON uuid = item_uuid";

// ---------------------------------------------------------------------------
// VaultDb
// ---------------------------------------------------------------------------

/// Handle to an open, decrypted Enpass database.
///
/// Only ever constructed once the sentinel table has been seen, so a handle
/// obtained with a wrong key cannot exist.
pub struct VaultDb {
    conn: Option<Connection>,
}

impl fmt::Debug for VaultDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VaultDb(***)")
    }
}

impl VaultDb {
    /// Open `path` read-only with the derived database key.
    ///
    /// 1. Opens the file read-only.
    /// 2. Injects the first 32 bytes of `key` as a raw `SQLCipher` key.
    /// 3. Selects `SQLCipher` 3 compatibility.
    /// 4. Looks for the `item` table in `sqlite_master`.
    ///
    /// # Errors
    ///
    /// - [`VaultError::AuthenticationFailed`] if the store cannot be read as a
    ///   database or the `item` table is not visible (wrong key)
    /// - [`VaultError::Database`] for other `SQLCipher` errors
    pub fn open(path: &Path, key: &SecretBytes<DERIVED_KEY_LEN>) -> Result<Self, VaultError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        inject_raw_key(&conn, page_key(key))?;
        conn.execute_batch("PRAGMA cipher_compatibility = 3;")?;

        verify_sentinel(&conn)?;

        tracing::debug!(db_path = %path.display(), "opened encrypted database");
        Ok(Self { conn: Some(conn) })
    }

    /// Every joined item/field row, in store order.
    ///
    /// Deleted and trashed rows are included; filtering is the catalog's job.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Locked`] after [`close`](Self::close)
    /// - [`VaultError::Database`] if the query or a row read fails
    pub fn entries(&self) -> Result<Vec<Entry>, VaultError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(ENTRY_QUERY)?;
        let rows = stmt.query_map([], Entry::from_row)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    /// Returns the `SQLCipher` version string, empty if unavailable.
    #[must_use]
    pub fn cipher_version(&self) -> String {
        self.conn
            .as_ref()
            .and_then(|c| {
                c.pragma_query_value(None, "cipher_version", |row| row.get(0))
                    .ok()
            })
            .unwrap_or_default()
    }

    /// Returns `true` until [`close`](Self::close) is called.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Close the connection. Safe to call any number of times.
    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            match conn.close() {
                Ok(()) => tracing::debug!("closed vault database"),
                Err((_, e)) => tracing::warn!(error = %e, "closing vault database failed"),
            }
        }
    }

    fn connection(&self) -> Result<&Connection, VaultError> {
        self.conn.as_ref().ok_or(VaultError::Locked)
    }
}

impl Drop for VaultDb {
    fn drop(&mut self) {
        self.close();
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// The part of the derived key SQLCipher uses: its first 32 bytes, i.e. the
/// first 64 characters of its hex form.
fn page_key(key: &SecretBytes<DERIVED_KEY_LEN>) -> &[u8] {
    &key.expose()[..PAGE_KEY_LEN]
}

/// Execute `PRAGMA key = "x'<hex>'"`, wiping the hex string and statement
/// afterwards.
fn inject_raw_key(conn: &Connection, raw_key: &[u8]) -> Result<(), VaultError> {
    let mut hex_key = data_encoding::HEXLOWER.encode(raw_key);
    let mut pragma = format!("PRAGMA key = \"x'{hex_key}'\";");

    let result = conn.execute_batch(&pragma);

    hex_key.zeroize();
    pragma.zeroize();

    result?;
    Ok(())
}

/// Look for the sentinel table.
///
/// A wrong page key does not reliably produce a distinct error: SQLCipher
/// either reports `SQLITE_NOTADB` (mapped to
/// [`VaultError::AuthenticationFailed`] by the `From` impl) or simply shows
/// no schema. Both cases end up here as an authentication failure.
fn verify_sentinel(conn: &Connection) -> Result<(), VaultError> {
    let name: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
            [SENTINEL_TABLE],
            |row| row.get(0),
        )
        .optional()?;

    match name.as_deref() {
        Some(SENTINEL_TABLE) => Ok(()),
        _ => Err(VaultError::AuthenticationFailed(
            "could not connect to database: item table not visible".into(),
        )),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
