//! PIN digest and verification.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SanctumError};

/// Number of digits in a PIN.
pub const PIN_LENGTH: usize = 4;

/// Length of a hex-encoded BLAKE3 digest.
const DIGEST_HEX_LENGTH: usize = 64;

/// Hex digest of a PIN, as persisted in a `PinRecord`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PinHash(String);

impl PinHash {
    /// Parse a stored digest, normalizing to lowercase hex.
    pub fn from_hex(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed.len() != DIGEST_HEX_LENGTH || !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(SanctumError::InvalidInput(
                "PIN hash must be a 64-character hex digest".to_string(),
            ));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PinHash {
    type Error = SanctumError;

    fn try_from(value: String) -> Result<Self> {
        PinHash::from_hex(&value)
    }
}

impl From<PinHash> for String {
    fn from(hash: PinHash) -> Self {
        hash.0
    }
}

// Digests of a 4-digit space are trivially reversible; keep them out of logs.
impl fmt::Debug for PinHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PinHash").field(&"[REDACTED]").finish()
    }
}

/// Hash a PIN.
///
/// Deterministic and unsalted. No format validation happens here; callers
/// that accept user input go through [`validate_pin`] first.
///
/// # Examples
///
/// ```
/// use sanctum_core::crypto::hash_pin;
///
/// assert_eq!(hash_pin("1234"), hash_pin("1234"));
/// assert_ne!(hash_pin("1234"), hash_pin("4321"));
/// ```
pub fn hash_pin(pin: &str) -> PinHash {
    PinHash(blake3::hash(pin.as_bytes()).to_hex().to_string())
}

/// Check a candidate PIN against a stored digest.
///
/// Comparison runs in constant time over the raw digest bytes.
pub fn verify_pin(pin: &str, hash: &PinHash) -> bool {
    match blake3::Hash::from_hex(hash.as_str()) {
        Ok(stored) => blake3::hash(pin.as_bytes()) == stored,
        Err(_) => false,
    }
}

/// Validate that a PIN is exactly four ASCII digits.
pub fn validate_pin(pin: &str) -> Result<()> {
    if pin.len() != PIN_LENGTH || !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SanctumError::InvalidPin(format!(
            "PIN must be exactly {} digits",
            PIN_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        assert_eq!(hash_pin("1234"), hash_pin("1234"));
        assert_eq!(hash_pin("0000").as_str().len(), DIGEST_HEX_LENGTH);
    }

    #[test]
    fn test_distinct_pins_distinct_hashes() {
        assert_ne!(hash_pin("1234"), hash_pin("1235"));
        assert_ne!(hash_pin("0000"), hash_pin("9999"));
    }

    #[test]
    fn test_hash_is_hex_digest() {
        let hash = hash_pin("4821");
        let bytes = hex::decode(hash.as_str()).unwrap();
        assert_eq!(bytes.len(), 32);
        assert!(!hash.as_str().contains("4821"));
    }

    #[test]
    fn test_verify_matches_only_original_pin() {
        let hash = hash_pin("1234");
        assert!(verify_pin("1234", &hash));
        assert!(!verify_pin("1243", &hash));
        assert!(!verify_pin("", &hash));
        assert!(!verify_pin("12345", &hash));
    }

    #[test]
    fn test_hasher_accepts_any_string() {
        let hash = hash_pin("not a pin");
        assert!(verify_pin("not a pin", &hash));
    }

    #[test]
    fn test_from_hex_normalizes_case() {
        let hash = hash_pin("7777");
        let upper = hash.as_str().to_ascii_uppercase();
        let parsed = PinHash::from_hex(&upper).unwrap();
        assert_eq!(parsed, hash);
        assert!(verify_pin("7777", &parsed));
    }

    #[test]
    fn test_from_hex_rejects_garbage() {
        assert!(PinHash::from_hex("").is_err());
        assert!(PinHash::from_hex("abc").is_err());
        assert!(PinHash::from_hex(&"z".repeat(64)).is_err());
    }

    #[test]
    fn test_debug_redacts_digest() {
        let hash = hash_pin("1234");
        let debug_output = format!("{:?}", hash);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains(&hash.as_str()[..8]));
    }

    #[test]
    fn test_validate_pin() {
        assert!(validate_pin("0000").is_ok());
        assert!(validate_pin("9876").is_ok());
        assert!(validate_pin("123").is_err());
        assert!(validate_pin("12345").is_err());
        assert!(validate_pin("12a4").is_err());
        assert!(validate_pin(" 123").is_err());
        assert!(validate_pin("١٢٣٤").is_err());
    }

    #[test]
    fn test_serde_round_trip_validates() {
        let hash = hash_pin("2468");
        let json = serde_json::to_string(&hash).unwrap();
        let parsed: PinHash = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, hash);

        let bad: std::result::Result<PinHash, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }
}
