use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{request::Parts, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::auth::password;
use crate::auth::session::{self, SessionError};
use crate::db::{Admin, LoginRequest, RefreshRequest, TokenPairResponse};
use crate::AppState;

/// Map session failures onto API errors, preserving their messages
fn session_error(err: SessionError) -> ApiError {
    match err {
        SessionError::InvalidToken | SessionError::InvalidSession | SessionError::Compromised => {
            ApiError::unauthorized(err.to_string())
        }
        SessionError::Internal(e) => {
            tracing::error!("Session operation failed: {}", e);
            ApiError::internal("Internal server error")
        }
    }
}

/// Login endpoint
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    let email = request.email.trim().to_lowercase();

    let admin = state.store.find_by_email(&email).await?;
    let stored_hash = admin.as_ref().map(|a| a.password_hash.clone());

    // Runs the full verification even when the account does not exist, so
    // response timing does not reveal which emails are registered
    let verified = password::verify_credential(request.password, stored_hash).await;

    let admin = match admin {
        Some(admin) if verified => admin,
        _ => return Err(ApiError::unauthorized("Invalid email or password")),
    };

    let pair = session::establish(&state.store, &state.tokens, &admin)
        .await
        .map_err(session_error)?;

    Ok(Json(TokenPairResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

/// Refresh endpoint. Exchanges a live refresh token for a fresh pair.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    let pair = session::rotate(&state.store, &state.tokens, &request.refresh_token)
        .await
        .map_err(session_error)?;

    Ok(Json(TokenPairResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

/// Logout endpoint. Revokes the caller's refresh session.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    admin: Admin,
) -> Result<StatusCode, ApiError> {
    session::clear(&state.store, admin.id)
        .await
        .map_err(session_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Extract the bearer token from request headers
fn extract_token(headers: &axum::http::HeaderMap) -> Option<String> {
    let auth_header = headers.get("Authorization").and_then(|h| h.to_str().ok())?;
    if auth_header.starts_with("Bearer ") {
        return Some(auth_header[7..].to_string());
    }
    None
}

/// Extractor for getting the current authenticated admin from a request
#[async_trait]
impl FromRequestParts<Arc<AppState>> for Admin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Missing or invalid authorization header"))?;

        let claims = state
            .tokens
            .verify_access(&token)
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

        // Re-read the account so role changes and deletions take effect
        // before the access token expires
        state
            .store
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))
    }
}
