// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault lifecycle: setup, unlock, lock, and passphrase rotation.
//!
//! Persisted state is limited to the salt, the KDF parameters and a
//! verification token (the encrypted marker `clarity_verified`). The derived
//! key lives only inside [`Vault`] while unlocked; every [`EncryptedStore`]
//! borrows it, so the borrow checker guarantees none survives [`Vault::lock`].

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clarity_config::model::VaultConfig;
use clarity_core::{ClarityError, KeyValueStore};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::crypto;
use crate::kdf::{self, DerivedKey, KdfParams, SALT_LEN};
use crate::migration::{self, MigrationReport};
use crate::store::{record_key, EncryptedStore, RECORD_PREFIX};

/// Storage key of the base64 salt.
pub const SALT_KEY: &str = "clarity_salt";
/// Storage key of the verification token.
pub const VERIFY_KEY: &str = "clarity_verify";
/// Storage key of the JSON KDF parameters.
pub const KDF_KEY: &str = "clarity_kdf";
/// Plaintext sealed into the verification token.
pub const VERIFICATION_MARKER: &str = "clarity_verified";

/// Where the vault is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    /// No salt or verification token persisted yet.
    Uninitialized,
    /// Vault exists; no key in memory.
    Locked,
    /// Key held in memory; encrypted store available.
    Unlocked,
}

impl std::fmt::Display for VaultState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            VaultState::Uninitialized => "uninitialized",
            VaultState::Locked => "locked",
            VaultState::Unlocked => "unlocked",
        })
    }
}

/// The vault lifecycle manager, owning the session key while unlocked.
pub struct Vault<S: KeyValueStore> {
    storage: Arc<S>,
    config: VaultConfig,
    session: Option<DerivedKey>,
}

impl<S: KeyValueStore> std::fmt::Debug for Vault<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("backend", &self.storage.name())
            .field("unlocked", &self.session.is_some())
            .finish()
    }
}

impl<S: KeyValueStore> Vault<S> {
    /// Create a locked manager over `storage`. Nothing is read or written yet.
    pub fn new(storage: Arc<S>, config: VaultConfig) -> Self {
        Self {
            storage,
            config,
            session: None,
        }
    }

    /// True iff both the salt and the verification token are persisted and non-empty.
    pub async fn is_setup(&self) -> Result<bool, ClarityError> {
        let salt = self.read_marker(SALT_KEY).await?;
        let token = self.read_marker(VERIFY_KEY).await?;
        Ok(salt.is_some() && token.is_some())
    }

    pub fn is_unlocked(&self) -> bool {
        self.session.is_some()
    }

    pub async fn state(&self) -> Result<VaultState, ClarityError> {
        if self.is_unlocked() {
            Ok(VaultState::Unlocked)
        } else if self.is_setup().await? {
            Ok(VaultState::Locked)
        } else {
            Ok(VaultState::Uninitialized)
        }
    }

    /// Create the vault from `passphrase`, unlock it, and migrate legacy values.
    ///
    /// Calling this on an existing vault replaces its salt and token, which
    /// orphans every record written under the old key. Callers gate on
    /// [`Vault::is_setup`] before offering setup.
    pub async fn setup(&mut self, passphrase: &SecretString) -> Result<MigrationReport, ClarityError> {
        self.check_strength(passphrase)?;

        if self.is_setup().await? {
            warn!("setup called on an existing vault -- previously encrypted records become unreadable");
        }

        let params = self.new_params()?;
        let salt = kdf::generate_salt()?;
        let key = params.derive(passphrase.expose_secret().as_bytes(), &salt)?;
        let token = crypto::encrypt(VERIFICATION_MARKER, &key)?;

        let salt_b64 = STANDARD.encode(salt);
        let params_json = params.to_json()?;
        self.storage
            .set_items(&[
                (KDF_KEY, params_json.as_str()),
                (SALT_KEY, salt_b64.as_str()),
                (VERIFY_KEY, token.as_str()),
            ])
            .await?;

        info!(iterations = params.iterations, "vault created");
        self.session = Some(key);

        self.migrate().await
    }

    /// Verify `passphrase` against the stored token and hold the derived key.
    pub async fn unlock(&mut self, passphrase: &SecretString) -> Result<(), ClarityError> {
        let key = self.verify(passphrase).await?;
        self.session = Some(key);
        info!("vault unlocked");
        Ok(())
    }

    /// Drop the session key. Persisted state is untouched.
    pub fn lock(&mut self) {
        if self.session.take().is_some() {
            info!("vault locked");
        }
    }

    /// The encrypted store for the current session.
    pub fn store(&self) -> Result<EncryptedStore<'_, S>, ClarityError> {
        let key = self.session.as_ref().ok_or(ClarityError::VaultLocked)?;
        Ok(EncryptedStore::new(key, self.storage.as_ref()))
    }

    /// Run the legacy plaintext migration with the session key.
    pub async fn migrate(&self) -> Result<MigrationReport, ClarityError> {
        let store = self.store()?;
        Ok(migration::migrate_legacy(self.storage.as_ref(), &store, &self.config.legacy_keys).await)
    }

    /// Re-key the vault under `new_passphrase`.
    ///
    /// The vault must be unlocked and `current` must verify. Every readable
    /// record is re-encrypted and written together with the new salt, token and
    /// KDF parameters in one batch. Records that no longer decrypt are left
    /// untouched and counted in the returned tuple `(reencrypted, skipped)`.
    pub async fn change_passphrase(
        &mut self,
        current: &SecretString,
        new_passphrase: &SecretString,
    ) -> Result<(usize, usize), ClarityError> {
        if !self.is_unlocked() {
            return Err(ClarityError::VaultLocked);
        }
        let old_key = self.verify(current).await?;
        self.check_strength(new_passphrase)?;

        let params = self.new_params()?;
        let salt = kdf::generate_salt()?;
        let new_key = params.derive(new_passphrase.expose_secret().as_bytes(), &salt)?;

        let old_store = EncryptedStore::new(&old_key, self.storage.as_ref());
        let mut items: Vec<(String, String)> = vec![
            (KDF_KEY.to_string(), params.to_json()?),
            (SALT_KEY.to_string(), STANDARD.encode(salt)),
            (
                VERIFY_KEY.to_string(),
                crypto::encrypt(VERIFICATION_MARKER, &new_key)?,
            ),
        ];
        let mut skipped = 0;
        for name in old_store.names().await? {
            match old_store.get(&name).await? {
                Some(value) => items.push((record_key(&name), crypto::encrypt(&value, &new_key)?)),
                None => skipped += 1,
            }
        }
        let reencrypted = items.len() - 3;

        let borrowed: Vec<(&str, &str)> = items
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        self.storage.set_items(&borrowed).await?;

        self.session = Some(new_key);
        info!(reencrypted, skipped, "vault passphrase changed");
        Ok((reencrypted, skipped))
    }

    /// Shared handle to the host storage.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Read a vault metadata key; an empty value counts as absent.
    async fn read_marker(&self, key: &str) -> Result<Option<String>, ClarityError> {
        Ok(self
            .storage
            .get_item(key)
            .await?
            .filter(|value| !value.is_empty()))
    }

    /// KDF parameters for a new salt, from config.
    fn new_params(&self) -> Result<KdfParams, ClarityError> {
        if self.config.kdf_iterations == 0 {
            return Err(ClarityError::Config(
                "vault.kdf_iterations must be greater than zero".to_string(),
            ));
        }
        Ok(KdfParams::pbkdf2_sha256(self.config.kdf_iterations))
    }

    fn check_strength(&self, passphrase: &SecretString) -> Result<(), ClarityError> {
        let min_len = self.config.min_passphrase_length;
        if passphrase.expose_secret().chars().count() < min_len {
            return Err(ClarityError::WeakPassphrase { min_len });
        }
        Ok(())
    }

    /// Derive a candidate key from `passphrase` and check it against the token.
    async fn verify(&self, passphrase: &SecretString) -> Result<DerivedKey, ClarityError> {
        let (Some(salt_b64), Some(token)) = (
            self.read_marker(SALT_KEY).await?,
            self.read_marker(VERIFY_KEY).await?,
        ) else {
            return Err(ClarityError::VaultNotFound);
        };

        let params = match self.storage.get_item(KDF_KEY).await? {
            Some(raw) => KdfParams::from_json(&raw)?,
            None => {
                debug!("no KDF record -- using legacy parameters");
                KdfParams::legacy()
            }
        };
        let salt = decode_salt(&salt_b64)?;
        let candidate = params.derive(passphrase.expose_secret().as_bytes(), &salt)?;

        match crypto::decrypt(&token, &candidate) {
            Ok(marker) if marker == VERIFICATION_MARKER => Ok(candidate),
            Err(ClarityError::CryptoUnavailable(msg)) => Err(ClarityError::CryptoUnavailable(msg)),
            _ => {
                debug!("verification token rejected candidate key");
                Err(ClarityError::WrongPassphrase)
            }
        }
    }
}

fn decode_salt(salt_b64: &str) -> Result<[u8; SALT_LEN], ClarityError> {
    STANDARD
        .decode(salt_b64.trim())
        .ok()
        .and_then(|bytes| <[u8; SALT_LEN]>::try_from(bytes).ok())
        .ok_or_else(|| {
            ClarityError::CorruptedVault(format!("salt is not {SALT_LEN} base64-encoded bytes"))
        })
}

/// Whether `storage_key` belongs to the vault rather than to application data.
pub fn is_reserved_key(storage_key: &str) -> bool {
    storage_key.starts_with(RECORD_PREFIX) || [SALT_KEY, VERIFY_KEY, KDF_KEY].contains(&storage_key)
}
