//! Entries ("cards") read from the item/field join, and their decryption.
//!
//! Every row of the join is one entry: the item's columns repeated next to
//! one of its fields. The field value is stored as hex `ciphertext || tag`,
//! sealed with the item's own key material and bound to the item UUID.

use std::fmt;

use enpass_crypto_core::{CryptoError, ItemKey, SecretBuffer};
use zeroize::Zeroize;

use crate::error::VaultError;

// ---------------------------------------------------------------------------
// Domain model
// ---------------------------------------------------------------------------

/// One item field joined with its item.
pub struct Entry {
    /// Item UUID; its 16 bytes are the AAD of the value.
    pub uuid: String,
    /// Field type (`"password"`, `"username"`, `"totp"`, ...).
    pub entry_type: String,
    /// Item creation time, Unix seconds.
    pub created_at: i64,
    /// Time the item's fields last changed, Unix seconds.
    pub updated_at: i64,
    /// Item title.
    pub title: String,
    /// Item subtitle, usually the login name.
    pub subtitle: String,
    /// Free-form note.
    pub note: String,
    /// Moved to the trash but still recoverable.
    pub trashed: bool,
    /// Deleted; key material may be cleared.
    pub deleted: bool,
    /// Item category (`"login"`, `"creditcard"`, ...).
    pub category: String,
    /// Field label.
    pub label: String,
    /// Last use, Unix seconds.
    pub last_used: i64,
    /// Whether the field is marked sensitive.
    pub sensitive: bool,
    /// Icon descriptor.
    pub icon: String,
    value: String,
    item_key: Vec<u8>,
}

impl Entry {
    /// Build an entry from a row of the item/field join.
    ///
    /// Nullable text columns read as empty strings, a `NULL` key as cleared
    /// key material.
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uuid: row.get(0)?,
            entry_type: text(row, 1)?,
            created_at: row.get::<_, Option<i64>>(2)?.unwrap_or_default(),
            updated_at: row.get::<_, Option<i64>>(3)?.unwrap_or_default(),
            title: text(row, 4)?,
            subtitle: text(row, 5)?,
            note: text(row, 6)?,
            trashed: flag(row, 7)?,
            deleted: flag(row, 8)?,
            category: text(row, 9)?,
            label: text(row, 10)?,
            value: text(row, 11)?,
            item_key: row.get::<_, Option<Vec<u8>>>(12)?.unwrap_or_default(),
            last_used: row.get::<_, Option<i64>>(13)?.unwrap_or_default(),
            sensitive: flag(row, 14)?,
            icon: text(row, 15)?,
        })
    }

    /// The stored hex ciphertext, tag included.
    #[must_use]
    pub fn raw_value(&self) -> &str {
        &self.value
    }

    /// Whether the item sits in the trash.
    #[must_use]
    pub const fn is_trashed(&self) -> bool {
        self.trashed
    }

    /// Whether the item is deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Decrypt the field value.
    ///
    /// Pure and repeatable: the entry is not modified and no plaintext is
    /// cached.
    ///
    /// # Errors
    ///
    /// - [`VaultError::EntryDeleted`] if the key material carries no nonce
    /// - [`VaultError::Malformed`] if the key material, value hex, or UUID
    ///   cannot be decoded
    /// - [`VaultError::AuthenticationFailed`] if the GCM tag does not verify
    pub fn decrypt(&self) -> Result<SecretBuffer, VaultError> {
        let key = ItemKey::parse(&self.item_key).map_err(|e| match e {
            CryptoError::Tombstoned => VaultError::EntryDeleted {
                uuid: self.uuid.clone(),
            },
            other => {
                VaultError::malformed(format!("key of entry {}", self.uuid), other.to_string())
            }
        })?;

        let ciphertext = data_encoding::HEXLOWER_PERMISSIVE
            .decode(self.value.as_bytes())
            .map_err(|e| {
                VaultError::malformed(format!("value of entry {}", self.uuid), e.to_string())
            })?;

        let aad = uuid_aad(&self.uuid)?;

        key.open(&ciphertext, &aad).map_err(|e| match e {
            CryptoError::Decryption => VaultError::AuthenticationFailed(format!(
                "value of entry {} failed authentication",
                self.uuid
            )),
            other => VaultError::from(other),
        })
    }

    /// Decrypt the field value as UTF-8 text.
    ///
    /// # Errors
    ///
    /// As [`decrypt`](Self::decrypt), plus [`VaultError::Malformed`] when
    /// the plaintext is not UTF-8.
    pub fn decrypt_to_string(&self) -> Result<String, VaultError> {
        let plaintext = self.decrypt()?;
        std::str::from_utf8(plaintext.expose())
            .map(ToOwned::to_owned)
            .map_err(|e| {
                VaultError::malformed(format!("plaintext of entry {}", self.uuid), e.to_string())
            })
    }
}

impl Drop for Entry {
    fn drop(&mut self) {
        self.value.zeroize();
        self.item_key.zeroize();
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("uuid", &self.uuid)
            .field("entry_type", &self.entry_type)
            .field("title", &self.title)
            .field("label", &self.label)
            .field("category", &self.category)
            .field("trashed", &self.trashed)
            .field("deleted", &self.deleted)
            .field("sensitive", &self.sensitive)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Row helpers
// ---------------------------------------------------------------------------

fn text(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
}

fn flag(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<bool> {
    Ok(row.get::<_, Option<i64>>(idx)?.is_some_and(|v| v != 0))
}

/// The UUID with hyphens removed, hex-decoded to 16 bytes.
fn uuid_aad(uuid: &str) -> Result<Vec<u8>, VaultError> {
    let compact: String = uuid.chars().filter(|c| *c != '-').collect();
    let bytes = data_encoding::HEXLOWER_PERMISSIVE
        .decode(compact.as_bytes())
        .map_err(|e| VaultError::malformed("entry uuid", format!("{uuid}: {e}")))?;
    if bytes.len() != 16 {
        return Err(VaultError::malformed(
            "entry uuid",
            format!("{uuid}: expected 16 bytes, got {}", bytes.len()),
        ));
    }
    Ok(bytes)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
