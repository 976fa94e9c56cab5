//! `enpass-vault`: read-only access to Enpass vaults.
//!
//! Derives the database key from the master password (and keyfile), opens
//! the `SQLCipher` store, and decrypts individual item fields on demand.
//! Entry points are [`Vault`] and, for environment-driven callers,
//! [`VaultConfig`].

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod db;
pub mod error;
pub mod lifecycle;

pub mod credentials;
pub mod keyfile;
pub mod unlock;
pub mod vault_info;

pub mod catalog;
pub mod entries;

pub mod config;

pub use catalog::{find_one, list, EntryFilter};
pub use config::{VaultConfig, KEYFILE_VAR, PASSWORD_VAR, VAULT_PATH_VAR};
pub use credentials::Credentials;
pub use db::VaultDb;
pub use entries::Entry;
pub use error::{KeyfileError, VaultError};
pub use keyfile::{decode_keyfile, load_keyfile};
pub use lifecycle::{SecretRecord, Vault, DATABASE_FILE};
pub use unlock::{derive_key, extract_salt, master_password};
pub use vault_info::{VaultInfo, VAULT_INFO_FILE};
