// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PBKDF2-HMAC-SHA256 key derivation from a passphrase.
//!
//! The iteration count is recorded per vault in [`KdfParams`] so that raising
//! the default never strands existing vaults. Vaults written before the record
//! existed are read with [`LEGACY_ITERATIONS`].

use std::num::NonZeroU32;

use clarity_core::ClarityError;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Iteration count of vaults that carry no KDF record.
pub const LEGACY_ITERATIONS: u32 = 100_000;

/// A symmetric key derived from the user's passphrase.
///
/// Zeroed on drop. Debug output never shows the key material.
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl DerivedKey {
    /// Wrap raw key material.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub(crate) fn expose(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Key derivation algorithms a vault may record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KdfAlgorithm {
    #[serde(rename = "pbkdf2-sha256")]
    Pbkdf2Sha256,
}

/// Per-vault KDF parameters, persisted as JSON next to the salt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KdfParams {
    pub algorithm: KdfAlgorithm,
    pub iterations: u32,
}

impl KdfParams {
    pub fn pbkdf2_sha256(iterations: u32) -> Self {
        Self {
            algorithm: KdfAlgorithm::Pbkdf2Sha256,
            iterations,
        }
    }

    /// Parameters assumed for vaults created before parameters were stored.
    pub fn legacy() -> Self {
        Self::pbkdf2_sha256(LEGACY_ITERATIONS)
    }

    pub fn to_json(&self) -> Result<String, ClarityError> {
        serde_json::to_string(self)
            .map_err(|e| ClarityError::Internal(format!("failed to encode KDF params: {e}")))
    }

    pub fn from_json(raw: &str) -> Result<Self, ClarityError> {
        serde_json::from_str(raw)
            .map_err(|e| ClarityError::CorruptedVault(format!("unreadable KDF params: {e}")))
    }

    /// Derive a key from `passphrase` and `salt` with these parameters.
    pub fn derive(&self, passphrase: &[u8], salt: &[u8; SALT_LEN]) -> Result<DerivedKey, ClarityError> {
        match self.algorithm {
            KdfAlgorithm::Pbkdf2Sha256 => derive_key(passphrase, salt, self.iterations),
        }
    }
}

/// Derive a 32-byte key from `passphrase` using PBKDF2-HMAC-SHA256.
///
/// Deterministic in all three inputs.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8; SALT_LEN],
    iterations: u32,
) -> Result<DerivedKey, ClarityError> {
    let iterations = NonZeroU32::new(iterations).ok_or_else(|| {
        ClarityError::CorruptedVault("KDF iteration count must be non-zero".to_string())
    })?;

    let mut output = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        salt,
        passphrase,
        output.as_mut(),
    );
    Ok(DerivedKey(output))
}

/// Generate a random 16-byte salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN], ClarityError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| ClarityError::CryptoUnavailable("failed to generate random salt".to_string()))?;
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn derive_key_produces_consistent_output() {
        let salt = [1u8; SALT_LEN];
        let key1 = derive_key(b"test passphrase", &salt, 1_000).unwrap();
        let key2 = derive_key(b"test passphrase", &salt, 1_000).unwrap();
        assert_eq!(key1.expose(), key2.expose());
    }

    #[test]
    fn different_passphrase_salt_or_iterations_change_the_key() {
        let base = derive_key(b"passphrase one", &[2u8; SALT_LEN], 1_000).unwrap();

        let other_pass = derive_key(b"passphrase two", &[2u8; SALT_LEN], 1_000).unwrap();
        let other_salt = derive_key(b"passphrase one", &[3u8; SALT_LEN], 1_000).unwrap();
        let other_iter = derive_key(b"passphrase one", &[2u8; SALT_LEN], 1_001).unwrap();

        assert_ne!(base.expose(), other_pass.expose());
        assert_ne!(base.expose(), other_salt.expose());
        assert_ne!(base.expose(), other_iter.expose());
    }

    #[test]
    fn matches_rfc7914_pbkdf2_vector() {
        // RFC 7914 section 11: PBKDF2-HMAC-SHA256("passwd", "salt", c=1), first 32 bytes.
        let mut out = [0u8; KEY_LEN];
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            NonZeroU32::new(1).unwrap(),
            b"salt",
            b"passwd",
            &mut out,
        );
        let expected: [u8; 8] = [0x55, 0xac, 0x04, 0x6e, 0x56, 0xe3, 0x08, 0x9f];
        assert_eq!(&out[..8], &expected);
    }

    #[test]
    fn zero_iterations_rejected() {
        let result = derive_key(b"pass", &[0u8; SALT_LEN], 0);
        assert!(matches!(result, Err(ClarityError::CorruptedVault(_))));
    }

    #[test]
    fn generate_salt_produces_random_values() {
        assert_ne!(generate_salt().unwrap(), generate_salt().unwrap());
    }

    #[test]
    fn params_json_shape_is_stable() {
        let json = KdfParams::pbkdf2_sha256(100_000).to_json().unwrap();
        assert_eq!(json, r#"{"algorithm":"pbkdf2-sha256","iterations":100000}"#);
        assert_eq!(KdfParams::from_json(&json).unwrap(), KdfParams::legacy());
    }

    #[test]
    fn unknown_algorithm_is_corruption() {
        let result = KdfParams::from_json(r#"{"algorithm":"md5","iterations":1}"#);
        assert!(matches!(result, Err(ClarityError::CorruptedVault(_))));
    }

    #[test]
    fn debug_redacts_key() {
        let key = DerivedKey::from_bytes([7u8; KEY_LEN]);
        assert_eq!(format!("{key:?}"), "DerivedKey([REDACTED])");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn derivation_is_deterministic(pass in ".{1,40}", salt in any::<[u8; SALT_LEN]>()) {
            let a = derive_key(pass.as_bytes(), &salt, 100).unwrap();
            let b = derive_key(pass.as_bytes(), &salt, 100).unwrap();
            prop_assert_eq!(a.expose(), b.expose());
        }
    }
}
