// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Clarity encrypted store.

use thiserror::Error;

/// The primary error type used across all Clarity crates.
///
/// Primitive-level failures (ring, rusqlite, base64) are converted into one of
/// these variants at the crate boundary and never surface to callers directly.
#[derive(Debug, Error)]
pub enum ClarityError {
    /// The host lacks a usable cryptographic primitive (RNG, AES key setup).
    #[error("cryptography unavailable: {0}")]
    CryptoUnavailable(String),

    /// AEAD open failed: wrong key, tampered, truncated or malformed blob.
    #[error("authentication failed -- wrong key or corrupted data")]
    AuthenticationFailed,

    /// The supplied passphrase did not validate against the verification token.
    #[error("incorrect passphrase")]
    WrongPassphrase,

    /// Unlock was attempted before any vault was configured.
    #[error("no vault configured -- run setup first")]
    VaultNotFound,

    /// Setup passphrase is shorter than the configured minimum.
    #[error("passphrase too short (minimum {min_len} characters)")]
    WeakPassphrase { min_len: usize },

    /// An encrypted-store operation was requested while the vault is locked.
    #[error("vault is locked")]
    VaultLocked,

    /// Persisted vault metadata (salt, KDF parameters) could not be read.
    #[error("corrupted vault: {0}")]
    CorruptedVault(String),

    /// Host key-value storage errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors (invalid TOML, failed validation).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ClarityError {
    /// Build a [`ClarityError::Storage`] from a message.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            source: message.into().into(),
        }
    }

    /// Whether the user can recover by re-entering input (wrong or weak passphrase).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::WrongPassphrase | Self::WeakPassphrase { .. } | Self::VaultNotFound
        )
    }
}
