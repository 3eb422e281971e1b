// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase entry from `CLARITY_VAULT_KEY` or an interactive terminal.

use std::io::IsTerminal;

use clarity_core::ClarityError;
use secrecy::SecretString;

/// Environment variable consulted before prompting.
pub const VAULT_KEY_ENV_VAR: &str = "CLARITY_VAULT_KEY";

/// Replacement passphrase for non-interactive rotation.
pub const NEW_VAULT_KEY_ENV_VAR: &str = "CLARITY_NEW_VAULT_KEY";

const NO_SOURCE: &str =
    "no passphrase available: set CLARITY_VAULT_KEY or run from an interactive terminal";

/// Non-empty passphrase from `var`, if set.
fn from_env(var: &str) -> Option<SecretString> {
    std::env::var(var)
        .ok()
        .filter(|key| !key.is_empty())
        .map(SecretString::from)
}

fn read_hidden(label: &str) -> Result<String, ClarityError> {
    rpassword::prompt_password(label)
        .map_err(|e| ClarityError::Internal(format!("failed to read passphrase: {e}")))
}

/// Passphrase for unlocking: environment first, then a hidden TTY prompt.
pub fn get_vault_passphrase() -> Result<SecretString, ClarityError> {
    if let Some(key) = from_env(VAULT_KEY_ENV_VAR) {
        return Ok(key);
    }
    if !std::io::stdin().is_terminal() {
        return Err(ClarityError::Internal(NO_SOURCE.to_string()));
    }
    let passphrase = read_hidden("Vault passphrase: ")?;
    if passphrase.is_empty() {
        return Err(ClarityError::Internal("empty passphrase".to_string()));
    }
    Ok(SecretString::from(passphrase))
}

/// Passphrase for vault creation, typed twice on a TTY.
///
/// The environment variable is taken as-is without confirmation.
pub fn get_vault_passphrase_with_confirm() -> Result<SecretString, ClarityError> {
    confirmed(VAULT_KEY_ENV_VAR, "New vault passphrase")
}

/// Replacement passphrase for rotation, from `CLARITY_NEW_VAULT_KEY` or typed twice.
pub fn get_new_vault_passphrase() -> Result<SecretString, ClarityError> {
    confirmed(NEW_VAULT_KEY_ENV_VAR, "Replacement passphrase")
}

fn confirmed(var: &str, label: &str) -> Result<SecretString, ClarityError> {
    if let Some(key) = from_env(var) {
        return Ok(key);
    }
    if !std::io::stdin().is_terminal() {
        return Err(ClarityError::Internal(NO_SOURCE.to_string()));
    }
    let first = read_hidden(&format!("{label}: "))?;
    let second = read_hidden(&format!("Confirm {}: ", label.to_lowercase()))?;
    confirm(first, second)
}

fn confirm(first: String, second: String) -> Result<SecretString, ClarityError> {
    if first != second {
        return Err(ClarityError::Internal("passphrases do not match".to_string()));
    }
    if first.is_empty() {
        return Err(ClarityError::Internal("empty passphrase".to_string()));
    }
    Ok(SecretString::from(first))
}
