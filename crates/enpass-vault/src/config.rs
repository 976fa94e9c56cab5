//! Vault location and credentials from the environment.
//!
//! | Variable | Meaning |
//! |---|---|
//! | `ENPASS_VAULT_PATH` | vault directory (required) |
//! | `ENPASS_PASSWORD` | master password |
//! | `ENPASS_KEYFILE` | keyfile path, for vaults that use one |
//!
//! Empty values count as unset.

use std::fmt;
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};

use crate::credentials::Credentials;
use crate::error::VaultError;
use crate::lifecycle::Vault;

/// Variable naming the vault directory.
pub const VAULT_PATH_VAR: &str = "ENPASS_VAULT_PATH";
/// Variable holding the master password.
pub const PASSWORD_VAR: &str = "ENPASS_PASSWORD";
/// Variable naming the keyfile.
pub const KEYFILE_VAR: &str = "ENPASS_KEYFILE";

/// Where the vault is and how to unlock it.
pub struct VaultConfig {
    /// Vault directory.
    pub vault_path: PathBuf,
    /// Keyfile, if the vault uses one.
    pub keyfile: Option<PathBuf>,
    password: Option<SecretString>,
}

impl VaultConfig {
    /// Read the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Configuration`] if `ENPASS_VAULT_PATH` is unset
    /// or empty.
    pub fn from_env() -> Result<Self, VaultError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, VaultError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let vault_path = get(VAULT_PATH_VAR)
            .map(PathBuf::from)
            .ok_or_else(|| VaultError::Configuration(format!("{VAULT_PATH_VAR} is not set")))?;
        let password = get(PASSWORD_VAR).map(SecretString::from);
        let keyfile = get(KEYFILE_VAR).map(PathBuf::from);

        tracing::debug!(
            vault_path = %vault_path.display(),
            has_password = password.is_some(),
            has_keyfile = keyfile.is_some(),
            "vault configuration loaded"
        );
        Ok(Self {
            vault_path,
            keyfile,
            password,
        })
    }

    /// Whether a password was configured.
    #[must_use]
    pub const fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Credentials built from the configured password and keyfile.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        let mut credentials = Credentials::new();
        if let Some(password) = &self.password {
            credentials = credentials.with_password(password.expose_secret());
        }
        if let Some(keyfile) = &self.keyfile {
            credentials = credentials.with_keyfile(keyfile.clone());
        }
        credentials
    }

    /// Locate and open the configured vault.
    ///
    /// # Errors
    ///
    /// Any error of [`Vault::new`] or [`Vault::open`]; a missing password
    /// is a [`VaultError::Configuration`].
    pub fn open_vault(&self) -> Result<Vault, VaultError> {
        let mut vault = Vault::new(&self.vault_path)?;
        vault.open(self.credentials())?;
        Ok(vault)
    }
}

impl fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultConfig")
            .field("vault_path", &self.vault_path)
            .field("keyfile", &self.keyfile)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}
