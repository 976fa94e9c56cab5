//! `enpass-crypto-core`: pure cryptographic primitives for reading Enpass vaults.
//!
//! No I/O, no database access: PBKDF2-HMAC-SHA512 database key derivation,
//! AES-256-GCM item decryption, and zeroize-on-drop secret containers.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod memory;

pub mod kdf;
pub mod symmetric;

pub use error::CryptoError;
pub use kdf::{
    derive_database_key, ensure_supported, CIPHER_ALGORITHM, DERIVED_KEY_LEN, KDF_ALGORITHM,
    SALT_LEN,
};
pub use memory::{SecretBuffer, SecretBytes};
pub use symmetric::{open, seal, ItemKey, ITEM_KEY_LEN, KEY_LEN, NONCE_LEN, TAG_LEN};
