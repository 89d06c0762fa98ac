//! Password hashing and token minting.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::{Engine as _, engine::general_purpose};
use rand::prelude::RngExt;
use rand::rng;

use crate::config::PasswordConfig;
use crate::errors::Error;

/// Argon2 hashing parameters.
#[derive(Debug, Clone, Copy)]
pub struct Argon2Params {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Argon2Params {
    /// Create Argon2 instance with these parameters.
    fn to_argon2(self) -> Result<Argon2<'static>, Error> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None).map_err(|e| Error::Internal {
            operation: format!("create argon2 params: {e}"),
        })?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for Argon2Params {
    /// Secure defaults for production (Argon2id RFC recommendations)
    fn default() -> Self {
        Self {
            memory_kib: 19456, // 19 MB
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl From<&PasswordConfig> for Argon2Params {
    fn from(config: &PasswordConfig) -> Self {
        Self {
            memory_kib: config.argon2_memory_kib,
            iterations: config.argon2_iterations,
            parallelism: config.argon2_parallelism,
        }
    }
}

/// Hash a password with the given Argon2 parameters.
pub fn hash_string_with_params(input: &str, params: Argon2Params) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = params.to_argon2()?;

    let hash = argon2.hash_password(input.as_bytes(), &salt).map_err(|e| Error::Internal {
        operation: format!("hash string: {e}"),
    })?;

    Ok(hash.to_string())
}

/// Hash a password with default secure parameters.
pub fn hash_string(input: &str) -> Result<String, Error> {
    hash_string_with_params(input, Argon2Params::default())
}

/// Verify a password against a stored hash.
///
/// Note: Verification uses the parameters embedded in the hash itself.
pub fn verify_string(input: &str, hash: &str) -> Result<bool, Error> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| Error::Internal {
        operation: format!("parse hash: {e}"),
    })?;

    // Verification always uses params from the hash
    let argon2 = Argon2::default();
    Ok(argon2.verify_password(input.as_bytes(), &parsed_hash).is_ok())
}

/// Mint an opaque auth token key.
///
/// 32 bytes (256 bits) of OS randomness, base64url-encoded without padding.
/// The key is stored verbatim and compared by equality, never derived from
/// maintainer data.
pub fn generate_token() -> String {
    let mut token_bytes = [0u8; 32];
    rng().fill(&mut token_bytes);

    general_purpose::URL_SAFE_NO_PAD.encode(token_bytes)
}
