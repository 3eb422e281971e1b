// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM encryption of string payloads.
//!
//! Every call to [`encrypt`] draws a fresh random 96-bit IV from the system
//! CSPRNG. The stored blob is `base64(IV || ciphertext || tag)`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clarity_core::ClarityError;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};

use crate::kdf::{DerivedKey, KEY_LEN};

/// IV length in bytes.
pub const IV_LEN: usize = 12;

/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` under `key` and return the base64 blob.
pub fn encrypt(plaintext: &str, key: &DerivedKey) -> Result<String, ClarityError> {
    let (ciphertext, iv) = seal(key.expose(), plaintext.as_bytes())?;

    let mut combined = Vec::with_capacity(IV_LEN + ciphertext.len());
    combined.extend_from_slice(&iv);
    combined.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(combined))
}

/// Decrypt a blob produced by [`encrypt`].
///
/// Malformed base64, a blob too short to hold IV and tag, a wrong key, and any
/// tampering all yield [`ClarityError::AuthenticationFailed`].
pub fn decrypt(blob: &str, key: &DerivedKey) -> Result<String, ClarityError> {
    let combined = STANDARD
        .decode(blob.trim())
        .map_err(|_| ClarityError::AuthenticationFailed)?;
    if combined.len() < IV_LEN + TAG_LEN {
        return Err(ClarityError::AuthenticationFailed);
    }

    let (iv, ciphertext) = combined.split_at(IV_LEN);
    let iv: [u8; IV_LEN] = iv.try_into().map_err(|_| ClarityError::AuthenticationFailed)?;
    let plaintext = open(key.expose(), &iv, ciphertext)?;

    String::from_utf8(plaintext)
        .map_err(|e| ClarityError::Internal(format!("decrypted value is not valid UTF-8: {e}")))
}

/// Seal raw bytes, returning `(ciphertext_with_tag, iv)`.
fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<(Vec<u8>, [u8; IV_LEN]), ClarityError> {
    let less_safe = aead_key(key)?;

    let rng = SystemRandom::new();
    let mut iv = [0u8; IV_LEN];
    rng.fill(&mut iv)
        .map_err(|_| ClarityError::CryptoUnavailable("failed to generate random IV".to_string()))?;

    // Seal in place: the buffer is extended with the authentication tag.
    let mut in_out = plaintext.to_vec();
    less_safe
        .seal_in_place_append_tag(Nonce::assume_unique_for_key(iv), Aad::empty(), &mut in_out)
        .map_err(|_| ClarityError::CryptoUnavailable("AES-256-GCM encryption failed".to_string()))?;

    Ok((in_out, iv))
}

fn open(key: &[u8; KEY_LEN], iv: &[u8; IV_LEN], ciphertext: &[u8]) -> Result<Vec<u8>, ClarityError> {
    let less_safe = aead_key(key)?;

    let mut in_out = ciphertext.to_vec();
    let plaintext = less_safe
        .open_in_place(Nonce::assume_unique_for_key(*iv), Aad::empty(), &mut in_out)
        .map_err(|_| ClarityError::AuthenticationFailed)?;

    Ok(plaintext.to_vec())
}

fn aead_key(key: &[u8; KEY_LEN]) -> Result<LessSafeKey, ClarityError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| ClarityError::CryptoUnavailable("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}
