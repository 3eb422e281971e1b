// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase-protected encrypted storage for Clarity.
//!
//! A passphrase is stretched with PBKDF2-HMAC-SHA256 into an AES-256-GCM key.
//! Only the salt, the KDF parameters and an encrypted verification token are
//! persisted; the key itself exists in memory while the [`Vault`] is unlocked.
//! Application values are stored under `enc_<name>` as
//! `base64(iv || ciphertext || tag)`.

pub mod crypto;
pub mod kdf;
pub mod migration;
pub mod prompt;
pub mod store;
pub mod vault;

pub use kdf::{DerivedKey, KdfAlgorithm, KdfParams};
pub use migration::{migrate_legacy, MigrationReport};
pub use prompt::{
    get_new_vault_passphrase, get_vault_passphrase, get_vault_passphrase_with_confirm,
    NEW_VAULT_KEY_ENV_VAR, VAULT_KEY_ENV_VAR,
};
pub use store::{record_key, EncryptedStore, Lookup, RECORD_PREFIX};
pub use vault::{is_reserved_key, Vault, VaultState};
