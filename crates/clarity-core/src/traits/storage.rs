// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host key-value storage trait (SQLite, in-memory, etc.).

use async_trait::async_trait;

use crate::error::ClarityError;

/// The host's local persistent key-value storage.
///
/// Values are opaque strings; the vault layer decides what goes in them
/// (base64 blobs for encrypted records, JSON for legacy plaintext). Writes are
/// last-write-wins per key.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Returns the human-readable name of this backend.
    fn name(&self) -> &str;

    /// Reads the value stored under `key`, or `None` if absent.
    async fn get_item(&self, key: &str) -> Result<Option<String>, ClarityError>;

    /// Stores `value` under `key`, replacing any prior value.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), ClarityError>;

    /// Deletes `key`. Removing an absent key is not an error.
    async fn remove_item(&self, key: &str) -> Result<(), ClarityError>;

    /// Lists every stored key in ascending order.
    async fn keys(&self) -> Result<Vec<String>, ClarityError>;

    /// Stores several entries. Backends with transactions apply them atomically;
    /// the default writes them one by one.
    async fn set_items(&self, items: &[(&str, &str)]) -> Result<(), ClarityError> {
        for (key, value) in items {
            self.set_item(key, value).await?;
        }
        Ok(())
    }
}
