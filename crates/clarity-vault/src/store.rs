// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypted key-value store over the host's local storage.
//!
//! Logical name `tasks` is persisted as `enc_tasks` holding an AES-256-GCM blob.
//! An [`EncryptedStore`] borrows the vault's session key, so it cannot outlive
//! a lock.

use clarity_core::{ClarityError, KeyValueStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::crypto;
use crate::kdf::DerivedKey;

/// Storage-key prefix of encrypted records.
pub const RECORD_PREFIX: &str = "enc_";

/// Storage key holding the record for logical `name`.
pub fn record_key(name: &str) -> String {
    format!("{RECORD_PREFIX}{name}")
}

/// Outcome of reading a logical name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The record exists and decrypted cleanly.
    Found(String),
    /// No record is stored under the name.
    NotFound,
    /// A record exists but failed authentication (corruption or stale key).
    Corrupted,
}

impl Lookup {
    /// Collapse to an `Option`, treating corruption as absence.
    pub fn into_option(self) -> Option<String> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound | Lookup::Corrupted => None,
        }
    }
}

/// Encrypts on write and decrypts on read, keyed by logical name.
pub struct EncryptedStore<'a, S: KeyValueStore + ?Sized> {
    key: &'a DerivedKey,
    storage: &'a S,
}

impl<S: KeyValueStore + ?Sized> std::fmt::Debug for EncryptedStore<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedStore")
            .field("backend", &self.storage.name())
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl<'a, S: KeyValueStore + ?Sized> EncryptedStore<'a, S> {
    pub fn new(key: &'a DerivedKey, storage: &'a S) -> Self {
        Self { key, storage }
    }

    /// Read `name`, distinguishing a missing record from an undecryptable one.
    ///
    /// Storage failures are returned as errors; decryption failures are not.
    pub async fn lookup(&self, name: &str) -> Result<Lookup, ClarityError> {
        let Some(blob) = self.storage.get_item(&record_key(name)).await? else {
            return Ok(Lookup::NotFound);
        };

        match crypto::decrypt(&blob, self.key) {
            Ok(value) => Ok(Lookup::Found(value)),
            Err(ClarityError::CryptoUnavailable(msg)) => Err(ClarityError::CryptoUnavailable(msg)),
            Err(e) => {
                debug!(name = %name, error = %e, "record failed to decrypt");
                Ok(Lookup::Corrupted)
            }
        }
    }

    /// Read `name`; a corrupted record reads as `None` (logged at warn level).
    pub async fn get(&self, name: &str) -> Result<Option<String>, ClarityError> {
        let lookup = self.lookup(name).await?;
        if lookup == Lookup::Corrupted {
            warn!(name = %name, "encrypted record is unreadable -- treating as missing");
        }
        Ok(lookup.into_option())
    }

    /// Encrypt `value` and store it under `name`, replacing any prior record.
    pub async fn set(&self, name: &str, value: &str) -> Result<(), ClarityError> {
        let blob = crypto::encrypt(value, self.key)?;
        self.storage.set_item(&record_key(name), &blob).await?;
        debug!(name = %name, "record stored");
        Ok(())
    }

    /// Delete the record for `name`.
    pub async fn remove(&self, name: &str) -> Result<(), ClarityError> {
        self.storage.remove_item(&record_key(name)).await?;
        debug!(name = %name, "record removed");
        Ok(())
    }

    /// Logical names of every stored record, sorted.
    pub async fn names(&self) -> Result<Vec<String>, ClarityError> {
        Ok(self
            .storage
            .keys()
            .await?
            .into_iter()
            .filter_map(|key| key.strip_prefix(RECORD_PREFIX).map(str::to_string))
            .collect())
    }

    /// Read `name` and parse it as JSON. Unparseable JSON reads as `None`.
    pub async fn get_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ClarityError> {
        let Some(raw) = self.get(name).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(name = %name, error = %e, "stored value is not valid JSON -- treating as missing");
                Ok(None)
            }
        }
    }

    /// Serialize `value` as JSON and store it under `name`.
    pub async fn set_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), ClarityError> {
        let raw = serde_json::to_string(value)
            .map_err(|e| ClarityError::Internal(format!("failed to encode `{name}` as JSON: {e}")))?;
        self.set(name, &raw).await
    }
}
