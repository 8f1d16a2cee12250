//! Argon2id implementation of the `PasswordHasher` port.
//!
//! Hashes are stored as PHC strings, so parameters and salt travel with the
//! hash and older hashes keep verifying after a parameter change.

use argon2::{Algorithm, Argon2, Params, Version};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    self, PasswordHash as PhcString, PasswordHasher as _, PasswordVerifier as _, SaltString,
};

use crate::domain::ports::{PasswordHashError, PasswordHasher};
use crate::domain::{Password, PasswordHash};

#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Argon2id with explicit cost parameters.
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = self
            .argon2
            .hash_password(password.expose().as_bytes(), &salt)
            .map_err(|err| PasswordHashError::hash(err.to_string()))?;
        Ok(PasswordHash::from_phc(phc.to_string()))
    }

    fn verify(&self, password: &Password, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
        let parsed = PhcString::new(hash.as_str())
            .map_err(|err| PasswordHashError::malformed(err.to_string()))?;
        match self
            .argon2
            .verify_password(password.expose().as_bytes(), &parsed)
        {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHashError::hash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::new()
    }

    fn password(value: &str) -> Password {
        Password::new(value).expect("password")
    }

    #[rstest]
    fn hash_round_trips_through_verify(hasher: Argon2PasswordHasher) {
        let hash = hasher.hash(&password("s3cret!")).expect("hash");

        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify(&password("s3cret!"), &hash).expect("verify"));
        assert!(!hasher.verify(&password("wrong"), &hash).expect("verify"));
    }

    #[rstest]
    fn same_password_gets_a_fresh_salt(hasher: Argon2PasswordHasher) {
        let first = hasher.hash(&password("s3cret!")).expect("hash");
        let second = hasher.hash(&password("s3cret!")).expect("hash");
        assert_ne!(first, second);
    }

    #[rstest]
    fn malformed_hash_is_reported(hasher: Argon2PasswordHasher) {
        let err = hasher
            .verify(&password("s3cret!"), &PasswordHash::from_phc("plain".to_owned()))
            .expect_err("malformed");
        assert!(matches!(err, PasswordHashError::Malformed { .. }));
    }
}
