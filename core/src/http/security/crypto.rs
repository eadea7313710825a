//! Password encoding utilities.
//!
//! Stored credentials keep an encoded password; login attempts are verified
//! with [`PasswordEncoder::matches`]. [`Argon2PasswordEncoder`] is the encoder
//! to use outside of tests.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use derive_more::{Display, Error};

/// Raised when a raw password cannot be encoded.
#[derive(Debug, Display, Error)]
#[display("password encoding failed: {reason}")]
pub struct EncodingError {
    reason: String,
}

/// Trait for encoding and verifying passwords.
///
/// # Example
/// ```
/// use access_gate_core::http::security::crypto::{PasswordEncoder, Argon2PasswordEncoder};
///
/// let encoder = Argon2PasswordEncoder::new();
/// let hash = encoder.encode("my_password").unwrap();
/// assert!(encoder.matches("my_password", &hash));
/// ```
pub trait PasswordEncoder: Send + Sync {
    /// Encode the raw password.
    fn encode(&self, raw_password: &str) -> Result<String, EncodingError>;

    /// Verify a raw password against an encoded password.
    fn matches(&self, raw_password: &str, encoded_password: &str) -> bool;
}

/// Argon2 password encoder.
///
/// Produces PHC strings (`$argon2id$v=19$...`) with a random salt per call.
/// Verification compares digests in constant time.
#[derive(Clone)]
pub struct Argon2PasswordEncoder {
    argon2: Argon2<'static>,
}

impl Argon2PasswordEncoder {
    /// Creates a new Argon2 password encoder with default settings.
    pub fn new() -> Self {
        Argon2PasswordEncoder {
            argon2: Argon2::default(),
        }
    }
}

impl Default for Argon2PasswordEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordEncoder for Argon2PasswordEncoder {
    fn encode(&self, raw_password: &str) -> Result<String, EncodingError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(raw_password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| EncodingError {
                reason: e.to_string(),
            })
    }

    fn matches(&self, raw_password: &str, encoded_password: &str) -> bool {
        match PasswordHash::new(encoded_password) {
            Ok(parsed_hash) => self
                .argon2
                .verify_password(raw_password.as_bytes(), &parsed_hash)
                .is_ok(),
            Err(_) => false,
        }
    }
}

/// No-op password encoder that stores passwords in plain text.
///
/// # Warning
/// **NEVER use this in production!** Only meant for tests, where Argon2 would
/// slow every login down.
///
/// # Example
/// ```
/// use access_gate_core::http::security::crypto::{PasswordEncoder, NoOpPasswordEncoder};
///
/// let encoder = NoOpPasswordEncoder;
/// let encoded = encoder.encode("password").unwrap();
/// assert_eq!(encoded, "password");
/// assert!(encoder.matches("password", &encoded));
/// ```
#[derive(Clone, Copy, Default)]
pub struct NoOpPasswordEncoder;

impl PasswordEncoder for NoOpPasswordEncoder {
    fn encode(&self, raw_password: &str) -> Result<String, EncodingError> {
        Ok(raw_password.to_string())
    }

    fn matches(&self, raw_password: &str, encoded_password: &str) -> bool {
        constant_time_eq(raw_password.as_bytes(), encoded_password.as_bytes())
    }
}

// Length is not secret; content is compared without early exit.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
