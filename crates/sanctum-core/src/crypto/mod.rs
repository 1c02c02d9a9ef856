//! Cryptographic primitives for Sanctum.
//!
//! - **Hasher**: unsalted BLAKE3 digest of the PIN, kept for verification only
//! - **Cipher**: Age passphrase encryption of credential passwords
//!
//! ## Security Model
//!
//! - The PIN is never stored; only its digest is
//! - The PIN is never key material; it only gates when decryption may be attempted
//! - A credential's encryption key is its own username (see [`cipher`])
//! - Decrypted passwords live in zeroizing secret wrappers
//!
//! ## Threat Model
//!
//! We defend against:
//! - Casual inspection of the stored credential table
//! - Reading the PIN out of storage
//!
//! We do NOT defend against:
//! - Anyone who can read the username stored next to the ciphertext
//! - Offline brute force of the 4-digit PIN digest

pub mod cipher;
pub mod hasher;

pub use cipher::{decrypt, encrypt, DecryptFailure};
pub use hasher::{hash_pin, validate_pin, verify_pin, PinHash, PIN_LENGTH};
