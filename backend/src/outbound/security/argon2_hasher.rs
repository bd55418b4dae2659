//! Argon2id implementation of the [`PasswordHasher`] port.
//!
//! Hashes are PHC strings (`$argon2id$v=19$...`) carrying their own salt and
//! parameters. Hashing is CPU bound, so both operations run on tokio's
//! blocking pool.

use argon2::Argon2;
use argon2::password_hash::{
    self, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use async_trait::async_trait;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHasher, PasswordHasherError};

/// Argon2id hasher using the crate's default cost parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordHasher;

fn hash_blocking(password: &[u8]) -> Result<String, PasswordHasherError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password, &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordHasherError::hash(err.to_string()))
}

fn verify_blocking(password: &[u8], stored: &str) -> Result<bool, PasswordHasherError> {
    let parsed = PasswordHash::new(stored)
        .map_err(|err| PasswordHasherError::malformed_hash(err.to_string()))?;
    match Argon2::default().verify_password(password, &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(PasswordHasherError::malformed_hash(err.to_string())),
    }
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, PasswordHasherError> {
        let password = Zeroizing::new(password.as_bytes().to_vec());
        tokio::task::spawn_blocking(move || hash_blocking(&password))
            .await
            .map_err(|err| PasswordHasherError::hash(format!("hashing task failed: {err}")))?
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHasherError> {
        let password = Zeroizing::new(password.as_bytes().to_vec());
        let stored = hash.to_owned();
        tokio::task::spawn_blocking(move || verify_blocking(&password, &stored))
            .await
            .map_err(|err| PasswordHasherError::hash(format!("verification task failed: {err}")))?
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn hashes_are_salted_phc_strings() {
        let hasher = Argon2PasswordHasher;
        let first = hasher.hash("admin123").await.expect("hash succeeds");
        let second = hasher.hash("admin123").await.expect("hash succeeds");

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
    }

    #[rstest]
    #[case("admin123", true)]
    #[case("admin124", false)]
    #[case("", false)]
    #[tokio::test]
    async fn verify_matches_only_the_original(#[case] attempt: &str, #[case] expected: bool) {
        let hasher = Argon2PasswordHasher;
        let stored = hasher.hash("admin123").await.expect("hash succeeds");

        let verified = hasher.verify(attempt, &stored).await.expect("verify runs");

        assert_eq!(verified, expected);
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_hashes_are_reported() {
        let err = Argon2PasswordHasher
            .verify("admin123", "plaintext")
            .await
            .expect_err("not a PHC string");

        assert!(matches!(err, PasswordHasherError::MalformedHash { .. }));
    }
}
