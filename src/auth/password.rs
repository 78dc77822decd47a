//! Password and refresh-token hashing.
//!
//! Argon2id covers both stored passwords and stored refresh-token hashes.
//! Lookups that find no account still verify against a fixed dummy hash, so
//! the absent-account path costs the same KDF work as a wrong password.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;

lazy_static! {
    /// Compared against when no account matches. Generated once with the
    /// same parameters as real hashes so the work factor is identical.
    static ref DUMMY_HASH: String =
        hash_blocking("gatekeepr-dummy-credential").expect("static dummy hash");
}

/// Hash a secret using Argon2
fn hash_blocking(secret: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(secret.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a secret against a hash
fn verify_blocking(secret: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Hash a password or refresh token without blocking the async scheduler.
pub async fn hash_password(secret: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_blocking(&secret))
        .await?
        .map_err(|e| anyhow!("Failed to hash credential: {}", e))
}

/// Verify a secret against an account's stored hash without blocking the
/// async scheduler.
///
/// A `None` stored hash (no such account) still runs the comparison against
/// the dummy hash and returns false, so callers get timing parity
/// between unknown accounts and wrong credentials.
pub async fn verify_credential(secret: String, stored_hash: Option<String>) -> bool {
    tokio::task::spawn_blocking(move || {
        let hash = stored_hash.as_deref().unwrap_or(DUMMY_HASH.as_str());
        let matched = verify_blocking(&secret, hash);
        matched && stored_hash.is_some()
    })
    .await
    .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_blocking("Secret123!").unwrap();
        assert!(verify_blocking("Secret123!", &hash));
        assert!(!verify_blocking("Secret124!", &hash));

        // Salted: hashing the same secret twice never collides
        assert_ne!(hash_blocking("Secret123!").unwrap(), hash);
    }

    #[test]
    fn test_verify_garbage_hash() {
        assert!(!verify_blocking("Secret123!", "not-a-phc-string"));
    }

    #[tokio::test]
    async fn test_verify_credential_rejects_absent_account() {
        assert!(!verify_credential("Secret123!".to_string(), None).await);
    }

    #[tokio::test]
    async fn test_verify_credential_round_trip() {
        let hash = hash_password("Secret123!".to_string()).await.unwrap();
        assert!(verify_credential("Secret123!".to_string(), Some(hash.clone())).await);
        assert!(!verify_credential("Secret124!".to_string(), Some(hash)).await);
    }

    #[tokio::test]
    async fn test_absent_account_costs_like_mismatch() {
        let hash = hash_password("Secret123!".to_string()).await.unwrap();

        let start = std::time::Instant::now();
        for _ in 0..3 {
            assert!(!verify_credential("WrongPass1!".to_string(), Some(hash.clone())).await);
        }
        let mismatch = start.elapsed();

        let start = std::time::Instant::now();
        for _ in 0..3 {
            assert!(!verify_credential("WrongPass1!".to_string(), None).await);
        }
        let absent = start.elapsed();

        // Both paths run the same KDF; allow generous scheduling slack
        assert!(
            absent * 4 > mismatch,
            "absent-account path returned too quickly: {:?} vs {:?}",
            absent,
            mismatch
        );
    }
}
