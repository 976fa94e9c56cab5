//! Credentials presented to [`Vault::open`](crate::Vault::open).

use std::fmt;
use std::path::PathBuf;

use enpass_crypto_core::{SecretBytes, DERIVED_KEY_LEN};
use secrecy::{ExposeSecret, SecretString};

/// Master password, optional keyfile, or a database key derived earlier.
///
/// Complete when it holds a non-empty password or a pre-derived key; an
/// incomplete set is refused before the store is touched.
#[derive(Default)]
pub struct Credentials {
    password: Option<SecretString>,
    keyfile: Option<PathBuf>,
    database_key: Option<SecretBytes<DERIVED_KEY_LEN>>,
}

impl Credentials {
    /// Empty credential set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the master password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Set the keyfile path.
    #[must_use]
    pub fn with_keyfile(mut self, path: impl Into<PathBuf>) -> Self {
        self.keyfile = Some(path.into());
        self
    }

    /// Supply an already derived 64-byte database key; derivation is skipped.
    #[must_use]
    pub fn with_database_key(mut self, key: SecretBytes<DERIVED_KEY_LEN>) -> Self {
        self.database_key = Some(key);
        self
    }

    /// `true` when a non-empty password or a pre-derived key is present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.password().is_some_and(|p| !p.is_empty()) || self.database_key.is_some()
    }

    pub(crate) fn password(&self) -> Option<&str> {
        self.password.as_ref().map(|p| p.expose_secret())
    }

    /// The keyfile path, if one was given.
    #[must_use]
    pub fn keyfile(&self) -> Option<&std::path::Path> {
        self.keyfile.as_deref()
    }

    pub(crate) fn take_database_key(&mut self) -> Option<SecretBytes<DERIVED_KEY_LEN>> {
        self.database_key.take()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("keyfile", &self.keyfile)
            .field("database_key", &self.database_key.as_ref().map(|_| "***"))
            .finish()
    }
}
