//! Credential hashing for stored accounts
//!
//! Accounts are stored only; there is no login protocol. The hash is
//! SHA-256 over `salt || password`, hex encoded.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Salt length in bytes (hex encoded to twice as many characters)
const SALT_BYTES: usize = 16;

/// Generate a random hex salt
pub fn generate_salt() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; SALT_BYTES] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hash a password with the given salt
///
/// # Examples
///
/// ```
/// use rumi_common::auth::hash_password;
///
/// let hash = hash_password("00ff", "secret");
/// assert_eq!(hash.len(), 64); // SHA-256 is 64 hex chars
/// assert_eq!(hash, hash_password("00ff", "secret"));
/// ```
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}
