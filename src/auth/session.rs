//! Refresh session rotation.
//!
//! Each account has at most one live refresh session, recorded as the argon2
//! hash of the most recently issued refresh token. Rotation verifies the
//! presented token cryptographically, compares it against the stored hash
//! like a password, and swaps in the replacement hash under a conditional
//! update. A mismatch or a lost swap means the token was already spent, and
//! the session is revoked on the spot: the holder must log in again.

use thiserror::Error;

use crate::db::{Admin, AdminStore};

use super::password;
use super::tokens::TokenService;

/// Freshly issued access/refresh pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Rotation failures. Everything except `Internal` maps to 401.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The presented token failed signature, expiry or class checks
    #[error("Invalid refresh token")]
    InvalidToken,

    /// No account, or no live session, for the token's subject
    #[error("Invalid session")]
    InvalidSession,

    /// The token was valid but already spent; the session has been revoked
    #[error("Session compromised")]
    Compromised,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for SessionError {
    fn from(e: sqlx::Error) -> Self {
        SessionError::Internal(e.into())
    }
}

/// Issue a token pair for a freshly authenticated admin and record the
/// refresh hash. Any previous session for the account is displaced.
pub async fn establish(
    store: &AdminStore,
    tokens: &TokenService,
    admin: &Admin,
) -> Result<TokenPair, SessionError> {
    let access_token = tokens.issue_access(admin.id, admin.role_enum())?;
    let refresh_token = tokens.issue_refresh(admin.id)?;

    let refresh_hash = password::hash_password(refresh_token.clone()).await?;
    store.set_refresh_hash(admin.id, &refresh_hash).await?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Exchange a presented refresh token for a fresh pair.
pub async fn rotate(
    store: &AdminStore,
    tokens: &TokenService,
    presented: &str,
) -> Result<TokenPair, SessionError> {
    let claims = tokens
        .verify_refresh(presented)
        .map_err(|_| SessionError::InvalidToken)?;

    let admin = store
        .find_by_id(claims.sub)
        .await?
        .ok_or(SessionError::InvalidSession)?;
    let stored_hash = admin
        .refresh_token_hash
        .clone()
        .ok_or(SessionError::InvalidSession)?;

    if !password::verify_credential(presented.to_string(), Some(stored_hash.clone())).await {
        // Cryptographically valid but not the live token: it was already
        // rotated out, so someone is replaying it
        tracing::warn!(
            "Refresh token reuse detected for admin {}, revoking session",
            admin.id
        );
        store.clear_refresh_hash(admin.id).await?;
        return Err(SessionError::Compromised);
    }

    let access_token = tokens.issue_access(admin.id, admin.role_enum())?;
    let refresh_token = tokens.issue_refresh(admin.id)?;
    let new_hash = password::hash_password(refresh_token.clone()).await?;

    // Conditional swap: if another rotation landed between our read and this
    // write, the presented token is spent and this attempt is a replay
    if !store
        .rotate_refresh_hash(admin.id, &stored_hash, &new_hash)
        .await?
    {
        tracing::warn!(
            "Concurrent refresh rotation for admin {}, revoking session",
            admin.id
        );
        store.clear_refresh_hash(admin.id).await?;
        return Err(SessionError::Compromised);
    }

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Drop the live session, if any. Idempotent.
pub async fn clear(store: &AdminStore, admin_id: i64) -> Result<(), SessionError> {
    store.clear_refresh_hash(admin_id).await?;
    Ok(())
}
