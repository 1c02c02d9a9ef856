//! Credential password encryption.
//!
//! Passwords are encrypted with Age passphrase encryption (scrypt recipient)
//! and base64 encoded so the ciphertext can sit in a text column.
//!
//! # Key material
//!
//! The key for a credential is its own `username`. The username is stored in
//! plaintext next to the ciphertext, so this is obfuscation against casual
//! inspection, not confidentiality. Two credentials sharing a username share a
//! key. Stored data depends on this scheme; changing it means migrating every
//! credential.

use std::io::{Read, Write};
use std::iter;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::SecretString;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::error::{Result, SanctumError};

/// Reason a ciphertext could not be recovered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecryptFailure {
    /// Ciphertext is intact but the key does not open it
    #[error("wrong key")]
    WrongKey,

    /// No key was supplied (credential has an empty username)
    #[error("missing key")]
    MissingKey,

    /// Ciphertext is malformed, truncated or not valid UTF-8 once opened
    #[error("corrupt ciphertext: {0}")]
    Corrupt(String),
}

/// Encrypt a plaintext secret under `key`.
///
/// # Errors
///
/// Returns `SanctumError::InvalidInput` for an empty key and
/// `SanctumError::Crypto` if the Age writer fails.
///
/// # Examples
///
/// ```
/// use secrecy::ExposeSecret;
/// use sanctum_core::crypto::{decrypt, encrypt};
///
/// let ciphertext = encrypt("secret1", "bob").unwrap();
/// assert_eq!(decrypt(&ciphertext, "bob").unwrap().expose_secret(), "secret1");
/// ```
pub fn encrypt(plaintext: &str, key: &str) -> Result<String> {
    if key.is_empty() {
        return Err(SanctumError::InvalidInput(
            "Encryption key cannot be empty".to_string(),
        ));
    }

    let encryptor = age::Encryptor::with_user_passphrase(SecretString::from(key.to_string()));

    let mut encrypted = Vec::new();
    let mut writer = encryptor
        .wrap_output(&mut encrypted)
        .map_err(|e| SanctumError::Crypto(format!("Failed to create encryptor: {}", e)))?;

    writer
        .write_all(plaintext.as_bytes())
        .map_err(|e| SanctumError::Crypto(format!("Encryption write failed: {}", e)))?;

    writer
        .finish()
        .map_err(|e| SanctumError::Crypto(format!("Encryption finish failed: {}", e)))?;

    Ok(STANDARD.encode(encrypted))
}

/// Decrypt a ciphertext produced by [`encrypt`].
///
/// The result is explicitly tagged: an empty secret is a successful
/// `Ok("")`, never a failure signal.
pub fn decrypt(ciphertext: &str, key: &str) -> std::result::Result<SecretString, DecryptFailure> {
    if key.is_empty() {
        return Err(DecryptFailure::MissingKey);
    }

    let encrypted = STANDARD
        .decode(ciphertext.trim().as_bytes())
        .map_err(|e| DecryptFailure::Corrupt(format!("invalid base64: {}", e)))?;

    let decryptor = age::Decryptor::new(&encrypted[..])
        .map_err(|e| DecryptFailure::Corrupt(format!("invalid header: {}", e)))?;

    let identity = age::scrypt::Identity::new(SecretString::from(key.to_string()));
    let mut reader = decryptor
        .decrypt(iter::once(&identity as &dyn age::Identity))
        .map_err(|e| match e {
            age::DecryptError::NoMatchingKeys
            | age::DecryptError::DecryptionFailed
            | age::DecryptError::KeyDecryptionFailed => DecryptFailure::WrongKey,
            other => DecryptFailure::Corrupt(other.to_string()),
        })?;

    let mut decrypted = Zeroizing::new(Vec::new());
    reader
        .read_to_end(&mut decrypted)
        .map_err(|e| DecryptFailure::Corrupt(format!("payload read failed: {}", e)))?;

    let plaintext = String::from_utf8(decrypted.to_vec())
        .map_err(|_| DecryptFailure::Corrupt("plaintext is not valid UTF-8".to_string()))?;
    Ok(SecretString::from(plaintext))
}
