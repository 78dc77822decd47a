//! Access and refresh token issuance and verification.
//!
//! Both token classes are HS256 JWTs. The payload carries a `kind` tag so a
//! token can never be replayed as the other class, even when the refresh
//! secret is configured to fall back to the access secret.

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;
use crate::db::Role;

/// A token that failed signature, expiry or class checks
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid or expired token")]
pub struct InvalidToken;

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject - the account id
    pub sub: i64,
    /// Role snapshot at issuance time; handlers re-read the account for the
    /// current role before authorizing anything
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Claims carried by a refresh token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject - the account id
    pub sub: i64,
    /// Unique token id; without it, two rotations inside the same second
    /// would mint byte-identical tokens and reuse detection could not tell
    /// them apart
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Token payloads keyed by class, decoded through one typed parser
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TokenClaims {
    Access(AccessClaims),
    Refresh(RefreshClaims),
}

/// Issues and verifies the access/refresh token pair.
#[derive(Clone)]
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Build the service from configuration.
    ///
    /// A missing access secret is fatal. The refresh secret falls back to
    /// the access secret, but refresh verification still goes through the
    /// refresh keys so the classes stay separate.
    pub fn from_config(auth: &AuthConfig) -> Result<Self> {
        let access_secret = match &auth.access_token_secret {
            Some(secret) if !secret.is_empty() => secret.clone(),
            _ => bail!(
                "No signing key configured: set auth.access_token_secret or GATEKEEPR_ACCESS_SECRET"
            ),
        };

        let refresh_secret = auth
            .refresh_token_secret
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| access_secret.clone());

        Ok(Self::new(
            &access_secret,
            &refresh_secret,
            Duration::minutes(auth.access_ttl_minutes),
            Duration::days(auth.refresh_ttl_days),
        ))
    }

    pub fn issue_access(&self, account_id: i64, role: Role) -> Result<String> {
        let now = Utc::now();
        let claims = TokenClaims::Access(AccessClaims {
            sub: account_id,
            role,
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
        });

        encode(&Header::new(Algorithm::HS256), &claims, &self.access_encoding)
            .context("Failed to encode access token")
    }

    pub fn issue_refresh(&self, account_id: i64) -> Result<String> {
        let now = Utc::now();
        let claims = TokenClaims::Refresh(RefreshClaims {
            sub: account_id,
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + self.refresh_ttl).timestamp(),
        });

        encode(&Header::new(Algorithm::HS256), &claims, &self.refresh_encoding)
            .context("Failed to encode refresh token")
    }

    fn verify(&self, token: &str, key: &DecodingKey) -> Result<TokenClaims, InvalidToken> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<TokenClaims>(token, key, &validation)
            .map(|data| data.claims)
            .map_err(|_| InvalidToken)
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, InvalidToken> {
        match self.verify(token, &self.access_decoding)? {
            TokenClaims::Access(claims) => Ok(claims),
            TokenClaims::Refresh(_) => Err(InvalidToken),
        }
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, InvalidToken> {
        match self.verify(token, &self.refresh_decoding)? {
            TokenClaims::Refresh(claims) => Ok(claims),
            TokenClaims::Access(_) => Err(InvalidToken),
        }
    }
}
