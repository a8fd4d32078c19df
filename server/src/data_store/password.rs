//! Salted password hashing for user accounts.
//!
//! Passwords are stored in the form `pbkdf2$<iterations>$<salt>$<hash>`, with salt and hash
//! base64-encoded. Storing the iteration count with each hash allows raising the work factor
//! later without invalidating existing credentials.

use base64::Engine;
use ring::rand::SecureRandom;
use ring::{digest, pbkdf2, rand};
use std::num::NonZeroU32;

const PBKDF2_ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;
const PBKDF2_ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = digest::SHA256_OUTPUT_LEN;

#[derive(Debug)]
pub enum PasswordError {
    /// The random number generator failed to produce a salt.
    RandomGenerationFailed,
    /// The stored hash string does not follow the expected format.
    MalformedHash,
}

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RandomGenerationFailed => f.write_str("Could not generate random salt"),
            Self::MalformedHash => f.write_str("Stored password hash is malformed"),
        }
    }
}

impl std::error::Error for PasswordError {}

/// Hash a cleartext password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let rng = rand::SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| PasswordError::RandomGenerationFailed)?;

    let mut hash = [0u8; HASH_LEN];
    let iterations = NonZeroU32::new(PBKDF2_ITERATIONS)
        .ok_or(PasswordError::RandomGenerationFailed)?;
    pbkdf2::derive(
        PBKDF2_ALGORITHM,
        iterations,
        &salt,
        password.as_bytes(),
        &mut hash,
    );

    let engine = base64::engine::general_purpose::STANDARD;
    Ok(format!(
        "pbkdf2${}${}${}",
        PBKDF2_ITERATIONS,
        engine.encode(salt),
        engine.encode(hash)
    ))
}

/// Verify a cleartext password against a stored hash string in constant time.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let mut parts = stored_hash.split('$');
    let (Some("pbkdf2"), Some(iterations), Some(salt), Some(hash), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(PasswordError::MalformedHash);
    };
    let iterations: u32 = iterations.parse().map_err(|_| PasswordError::MalformedHash)?;
    let iterations = NonZeroU32::new(iterations).ok_or(PasswordError::MalformedHash)?;
    let engine = base64::engine::general_purpose::STANDARD;
    let salt = engine
        .decode(salt)
        .map_err(|_| PasswordError::MalformedHash)?;
    let hash = engine
        .decode(hash)
        .map_err(|_| PasswordError::MalformedHash)?;

    Ok(pbkdf2::verify(
        PBKDF2_ALGORITHM,
        iterations,
        &salt,
        password.as_bytes(),
        &hash,
    )
    .is_ok())
}
