//! Password Hashing
//! Mission: One-way salted hashing and verification of account passwords

use anyhow::{Context, Result};

/// bcrypt work factor. Tunable against brute force; raising it makes
/// every hash and verification proportionally slower.
pub const WORK_FACTOR: u32 = 10;

/// Hash a plaintext password with a fresh salt.
pub fn hash_password(plaintext: &str) -> Result<String> {
    bcrypt::hash(plaintext, WORK_FACTOR).context("Failed to hash password")
}

/// Verify a plaintext password against a stored hash.
///
/// A malformed hash is treated as a mismatch, never an error; bcrypt's
/// comparison is resistant to timing analysis.
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    bcrypt::verify(plaintext, hash).unwrap_or(false)
}
