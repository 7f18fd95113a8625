use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::{Error, Result};

// Session tokens carry 96 random bits, so a cheap parameter set is enough for them.
const TOKEN_MEMORY: u32 = 64 * 1024; // 64KB
const TOKEN_ITERATIONS: u32 = 1;
const TOKEN_PARALLELISM: u32 = 4;
const TOKEN_OUTPUT_LEN: usize = 32;

/// Argon2id hashing for user passwords and session tokens.
pub struct Hasher {
    argon2: Argon2<'static>,
}

impl Hasher {
    /// Argon2id with the crate's recommended defaults, for user passwords.
    #[must_use]
    pub fn for_passwords() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Low-cost Argon2id, for high-entropy session tokens checked on every request.
    #[must_use]
    pub fn for_tokens() -> Self {
        let params = Params::new(
            TOKEN_MEMORY,
            TOKEN_ITERATIONS,
            TOKEN_PARALLELISM,
            Some(TOKEN_OUTPUT_LEN),
        )
        .expect("invalid argon2 params");

        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Hashes a secret into a PHC string with an embedded random salt.
    pub fn hash(&self, secret: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| Error::Hash(format!("failed to hash secret: {e}")))?;
        Ok(hash.to_string())
    }

    /// Verifies a secret against a stored PHC hash.
    pub fn verify(&self, secret: &str, hash: &str) -> Result<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| Error::Hash(format!("invalid hash format: {e}")))?;

        match self.argon2.verify_password(secret.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(Error::Hash(format!("failed to verify secret: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_round_trip() {
        let hasher = Hasher::for_passwords();
        let hash = hasher.hash("correct horse").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("correct horse"));
        assert!(hasher.verify("correct horse", &hash).unwrap());
        assert!(!hasher.verify("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_same_secret_gets_distinct_salts() {
        let hasher = Hasher::for_tokens();
        let a = hasher.hash("secret").unwrap();
        let b = hasher.hash("secret").unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        let hasher = Hasher::for_tokens();
        assert!(matches!(
            hasher.verify("secret", "plaintext"),
            Err(Error::Hash(_))
        ));
    }
}
