//! Admin account endpoints with role-scoped access control.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::auth::password;
use crate::auth::roles::{can_perform, AdminAction};
use crate::db::{
    Admin, AdminListQuery, AdminListResponse, AdminResponse, NewAdmin, RegisterAdminRequest, Role,
    UpdateAdminRequest, UpdatePasswordRequest,
};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{
    validate_account_id, validate_email, validate_name, validate_password, validate_phone,
    validate_role,
};

/// Empty or whitespace phone strings are stored as no phone
fn normalize_phone(phone: Option<String>) -> Option<String> {
    phone
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
}

/// Validate a RegisterAdminRequest
fn validate_register_request(req: &RegisterAdminRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_name(&req.name) {
        errors.add("name", &e);
    }
    if let Err(e) = validate_email(&req.email) {
        errors.add("email", &e);
    }
    if let Err(e) = validate_phone(&req.phone) {
        errors.add("phone", &e);
    }
    if let Err(e) = validate_password(&req.password) {
        errors.add("password", &e);
    }
    if let Err(e) = validate_role(&req.role) {
        errors.add("role", &e);
    }

    errors.finish()
}

/// Validate an UpdateAdminRequest
fn validate_update_request(req: &UpdateAdminRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Some(ref name) = req.name {
        if let Err(e) = validate_name(name) {
            errors.add("name", &e);
        }
    }
    if let Some(ref email) = req.email {
        if let Err(e) = validate_email(email) {
            errors.add("email", &e);
        }
    }
    if let Err(e) = validate_phone(&req.phone) {
        errors.add("phone", &e);
    }
    if let Some(ref role) = req.role {
        if let Err(e) = validate_role(role) {
            errors.add("role", &e);
        }
    }

    errors.finish()
}

/// Validate an UpdatePasswordRequest
fn validate_password_request(req: &UpdatePasswordRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if req.new_password.len() < 8 {
        errors.add("new_password", "New password must be at least 8 characters long");
    }
    if req.confirm_password.len() < 8 {
        errors.add(
            "confirm_password",
            "Confirm password must be at least 8 characters long",
        );
    }
    if let Some(ref old) = req.old_password {
        if old.len() < 8 {
            errors.add("old_password", "Old password must be at least 8 characters long");
        }
    }
    if req.new_password != req.confirm_password {
        errors.add(
            "confirm_password",
            "New password and confirmation password do not match",
        );
    }

    errors.finish()
}

/// Register a new admin account
pub async fn register_admin(
    State(state): State<Arc<AppState>>,
    requester: Admin,
    Json(req): Json<RegisterAdminRequest>,
) -> Result<(StatusCode, Json<AdminResponse>), ApiError> {
    validate_register_request(&req)?;
    // The string parses; validation just proved it
    let assigned_role = Role::from(req.role.clone());

    if !can_perform(
        requester.role_enum(),
        AdminAction::Create { assigned_role },
        None,
        false,
    ) {
        return Err(ApiError::forbidden(
            "Insufficient privileges to create this account",
        ));
    }

    let email = req.email.trim().to_lowercase();
    if state.store.email_taken(&email, None).await? {
        return Err(ApiError::conflict("Admin with this email already exists"));
    }

    let phone = normalize_phone(req.phone);
    if let Some(ref phone) = phone {
        if state.store.phone_taken(phone, None).await? {
            return Err(ApiError::conflict(
                "Phone number is already taken by another admin",
            ));
        }
    }

    let password_hash = password::hash_password(req.password).await.map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal("Internal server error")
    })?;

    let admin = state
        .store
        .insert(NewAdmin {
            name: req.name.trim().to_string(),
            email,
            phone,
            password_hash,
            role: assigned_role,
        })
        .await?;

    tracing::info!("Admin {} registered account {} ({})", requester.id, admin.id, admin.role);

    Ok((StatusCode::CREATED, Json(AdminResponse::from(admin))))
}

/// List admin accounts with pagination
pub async fn list_admins(
    State(state): State<Arc<AppState>>,
    _requester: Admin,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<AdminListResponse>, ApiError> {
    Ok(Json(state.store.list(&query).await?))
}

/// Get a single admin account by id
pub async fn get_admin(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    _requester: Admin,
) -> Result<Json<AdminResponse>, ApiError> {
    if let Err(e) = validate_account_id(id) {
        return Err(ApiError::validation_field("id", e));
    }

    let admin = state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Admin not found"))?;

    Ok(Json(AdminResponse::from(admin)))
}

/// Update admin account details
pub async fn update_admin(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    requester: Admin,
    Json(req): Json<UpdateAdminRequest>,
) -> Result<Json<AdminResponse>, ApiError> {
    if let Err(e) = validate_account_id(id) {
        return Err(ApiError::validation_field("id", e));
    }
    validate_update_request(&req)?;

    let target = state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Admin not found"))?;

    // A role field equal to the current role is not a role change
    let new_role = req
        .role
        .as_ref()
        .map(|role| Role::from(role.clone()))
        .filter(|requested| *requested != target.role_enum());

    let is_self = requester.id == target.id;
    if !can_perform(
        requester.role_enum(),
        AdminAction::Update { new_role },
        Some(target.role_enum()),
        is_self,
    ) {
        if is_self && new_role.is_some() {
            return Err(ApiError::forbidden("You cannot change your own role"));
        }
        return Err(ApiError::forbidden(
            "Insufficient privileges to update this account",
        ));
    }

    let email = req.email.as_ref().map(|e| e.trim().to_lowercase());
    if let Some(ref email) = email {
        if state.store.email_taken(email, Some(target.id)).await? {
            return Err(ApiError::conflict(
                "Email is already taken by another admin",
            ));
        }
    }

    let phone = normalize_phone(req.phone.clone());
    if let Some(ref phone) = phone {
        if state.store.phone_taken(phone, Some(target.id)).await? {
            return Err(ApiError::conflict(
                "Phone number is already taken by another admin",
            ));
        }
    }

    let name = req.name.as_ref().map(|n| n.trim().to_string());

    state
        .store
        .update_details(
            target.id,
            name.as_deref(),
            email.as_deref(),
            phone.as_deref(),
            new_role,
        )
        .await?;

    if let Some(role) = new_role {
        tracing::info!("Admin {} changed role of account {} to {}", requester.id, target.id, role);
    }

    let updated = state
        .store
        .find_by_id(target.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Admin not found"))?;

    Ok(Json(AdminResponse::from(updated)))
}

/// Change an admin account password. Changing your own requires the old
/// password; any change revokes the account's refresh session.
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    requester: Admin,
    Json(req): Json<UpdatePasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if let Err(e) = validate_account_id(id) {
        return Err(ApiError::validation_field("id", e));
    }
    validate_password_request(&req)?;

    let target = state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Admin not found"))?;

    let is_self = requester.id == target.id;
    if !can_perform(
        requester.role_enum(),
        AdminAction::ResetPassword,
        Some(target.role_enum()),
        is_self,
    ) {
        return Err(ApiError::forbidden(
            "You do not have permission to update this admin's password",
        ));
    }

    if is_self {
        let old_password = req.old_password.clone().ok_or_else(|| {
            ApiError::validation_field(
                "old_password",
                "Old password is required to change your own password",
            )
        })?;

        if !password::verify_credential(old_password, Some(target.password_hash.clone())).await {
            return Err(ApiError::unauthorized("The provided old password is incorrect"));
        }
    }

    let password_hash = password::hash_password(req.new_password).await.map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal("Internal server error")
    })?;

    // Also clears the refresh hash, so any live session dies with the
    // old password
    state.store.update_password(target.id, &password_hash).await?;

    tracing::info!("Admin {} changed password for account {}", requester.id, target.id);

    Ok(Json(serde_json::json!({
        "message": "Admin password updated successfully",
        "admin_id": target.id
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ErrorCode;
    use crate::auth::tokens::TokenService;
    use crate::config::Config;
    use crate::db::{test_pool, AdminStore};
    use chrono::Duration;

    async fn test_state() -> Arc<AppState> {
        let store = AdminStore::new(test_pool().await);
        let tokens = TokenService::new(
            "access-secret",
            "refresh-secret",
            Duration::minutes(30),
            Duration::days(7),
        );
        Arc::new(AppState::new(Config::default(), store, tokens))
    }

    async fn seed(state: &Arc<AppState>, email: &str, role: Role) -> Admin {
        state
            .store
            .insert(NewAdmin {
                name: "Seeded Admin".to_string(),
                email: email.to_string(),
                phone: None,
                password_hash: "$argon2id$stub".to_string(),
                role,
            })
            .await
            .unwrap()
    }

    fn register_request(email: &str, role: &str) -> RegisterAdminRequest {
        RegisterAdminRequest {
            name: "Alice".to_string(),
            email: email.to_string(),
            phone: None,
            password: "Abcdef1!".to_string(),
            role: role.to_string(),
        }
    }

    fn empty_update() -> UpdateAdminRequest {
        UpdateAdminRequest {
            name: None,
            email: None,
            phone: None,
            role: None,
        }
    }

    #[tokio::test]
    async fn test_admin_registers_moderator_but_not_admin() {
        let state = test_state().await;
        let requester = seed(&state, "boss@example.com", Role::Admin).await;

        let (status, Json(created)) = register_admin(
            State(state.clone()),
            requester.clone(),
            Json(register_request("a@x.com", "moderator")),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(created.id > 0);
        assert_eq!(created.role, "moderator");

        let err = register_admin(
            State(state.clone()),
            requester,
            Json(register_request("b@x.com", "admin")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_moderator_cannot_register_anyone() {
        let state = test_state().await;
        let requester = seed(&state, "mod@example.com", Role::Moderator).await;

        for role in ["moderator", "admin", "super_admin"] {
            let err = register_admin(
                State(state.clone()),
                requester.clone(),
                Json(register_request("new@x.com", role)),
            )
            .await
            .unwrap_err();
            assert_eq!(err.code(), ErrorCode::Forbidden);
        }
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email_and_bad_input() {
        let state = test_state().await;
        let requester = seed(&state, "root@example.com", Role::SuperAdmin).await;

        register_admin(
            State(state.clone()),
            requester.clone(),
            Json(register_request("a@x.com", "moderator")),
        )
        .await
        .unwrap();

        // Same email, case-folded
        let err = register_admin(
            State(state.clone()),
            requester.clone(),
            Json(register_request("A@X.com", "moderator")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Conflict);

        let mut bad = register_request("c@x.com", "moderator");
        bad.password = "weak".to_string();
        bad.name = "A".to_string();
        let err = register_admin(State(state.clone()), requester, Json(bad))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_list_pagination_envelope() {
        let state = test_state().await;
        let requester = seed(&state, "root@example.com", Role::SuperAdmin).await;
        for i in 0..24 {
            seed(&state, &format!("admin{}@example.com", i), Role::Moderator).await;
        }

        let Json(page) = list_admins(
            State(state.clone()),
            requester,
            Query(AdminListQuery {
                page: Some(2),
                limit: Some(10),
            }),
        )
        .await
        .unwrap();

        assert_eq!(page.items.len(), 10);
        assert_eq!(page.total, 25);
        assert_eq!(page.page, 2);
        assert_eq!(page.per_page, 10);
        assert_eq!(page.total_pages, 3);
    }

    #[tokio::test]
    async fn test_get_admin_found_and_missing() {
        let state = test_state().await;
        let requester = seed(&state, "root@example.com", Role::SuperAdmin).await;

        let Json(found) = get_admin(State(state.clone()), Path(requester.id), requester.clone())
            .await
            .unwrap();
        assert_eq!(found.email, "root@example.com");

        let err = get_admin(State(state.clone()), Path(4242), requester.clone())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);

        let err = get_admin(State(state.clone()), Path(0), requester)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_admin_updates_moderator_details_only_below_admin() {
        let state = test_state().await;
        let requester = seed(&state, "boss@example.com", Role::Admin).await;
        let target = seed(&state, "mod@example.com", Role::Moderator).await;

        let mut req = empty_update();
        req.name = Some("Renamed Moderator".to_string());
        let Json(updated) = update_admin(
            State(state.clone()),
            Path(target.id),
            requester.clone(),
            Json(req),
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Renamed Moderator");

        // Promoting a moderator to admin is out of an admin's reach
        let mut req = empty_update();
        req.role = Some("admin".to_string());
        let err = update_admin(
            State(state.clone()),
            Path(target.id),
            requester.clone(),
            Json(req),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);

        // Admin targets are off limits entirely
        let peer = seed(&state, "peer@example.com", Role::Admin).await;
        let mut req = empty_update();
        req.name = Some("Nope".to_string());
        let err = update_admin(State(state.clone()), Path(peer.id), requester, Json(req))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_own_role_change_denied_even_for_super_admin() {
        let state = test_state().await;
        let requester = seed(&state, "root@example.com", Role::SuperAdmin).await;

        let mut req = empty_update();
        req.role = Some("admin".to_string());
        let err = update_admin(
            State(state.clone()),
            Path(requester.id),
            requester.clone(),
            Json(req),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(err.message(), "You cannot change your own role");

        // Restating the current role is not a role change
        let mut req = empty_update();
        req.role = Some("super_admin".to_string());
        req.name = Some("Still Root".to_string());
        let Json(updated) = update_admin(
            State(state.clone()),
            Path(requester.id),
            requester,
            Json(req),
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Still Root");
        assert_eq!(updated.role, "super_admin");
    }

    #[tokio::test]
    async fn test_update_conflicts_on_taken_email() {
        let state = test_state().await;
        let requester = seed(&state, "root@example.com", Role::SuperAdmin).await;
        let target = seed(&state, "mod@example.com", Role::Moderator).await;

        let mut req = empty_update();
        req.email = Some("Root@Example.com".to_string());
        let err = update_admin(State(state.clone()), Path(target.id), requester, Json(req))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn test_self_password_change_requires_correct_old_password() {
        let state = test_state().await;
        let hash = password::hash_password("Origina1!pw".to_string())
            .await
            .unwrap();
        let requester = state
            .store
            .insert(NewAdmin {
                name: "Self Changer".to_string(),
                email: "self@example.com".to_string(),
                phone: None,
                password_hash: hash,
                role: Role::Moderator,
            })
            .await
            .unwrap();
        state
            .store
            .set_refresh_hash(requester.id, "$argon2id$live-session")
            .await
            .unwrap();

        // Missing old password
        let err = update_password(
            State(state.clone()),
            Path(requester.id),
            requester.clone(),
            Json(UpdatePasswordRequest {
                old_password: None,
                new_password: "Replace1!pw".to_string(),
                confirm_password: "Replace1!pw".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);

        // Wrong old password leaves the account untouched
        let err = update_password(
            State(state.clone()),
            Path(requester.id),
            requester.clone(),
            Json(UpdatePasswordRequest {
                old_password: Some("Wrong0ld!pw".to_string()),
                new_password: "Replace1!pw".to_string(),
                confirm_password: "Replace1!pw".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        let unchanged = state.store.find_by_id(requester.id).await.unwrap().unwrap();
        assert_eq!(unchanged.password_hash, requester.password_hash);
        assert!(unchanged.refresh_token_hash.is_some());

        // Correct old password rotates the hash and revokes the session
        update_password(
            State(state.clone()),
            Path(requester.id),
            requester.clone(),
            Json(UpdatePasswordRequest {
                old_password: Some("Origina1!pw".to_string()),
                new_password: "Replace1!pw".to_string(),
                confirm_password: "Replace1!pw".to_string(),
            }),
        )
        .await
        .unwrap();
        let changed = state.store.find_by_id(requester.id).await.unwrap().unwrap();
        assert_ne!(changed.password_hash, requester.password_hash);
        assert!(changed.refresh_token_hash.is_none());
    }

    #[tokio::test]
    async fn test_password_reset_respects_hierarchy() {
        let state = test_state().await;
        let admin = seed(&state, "boss@example.com", Role::Admin).await;
        let moderator = seed(&state, "mod@example.com", Role::Moderator).await;
        let peer = seed(&state, "peer@example.com", Role::Admin).await;

        // Admin resets a moderator without the old password
        update_password(
            State(state.clone()),
            Path(moderator.id),
            admin.clone(),
            Json(UpdatePasswordRequest {
                old_password: None,
                new_password: "Reset4dm1n!".to_string(),
                confirm_password: "Reset4dm1n!".to_string(),
            }),
        )
        .await
        .unwrap();

        // But not a fellow admin
        let err = update_password(
            State(state.clone()),
            Path(peer.id),
            admin,
            Json(UpdatePasswordRequest {
                old_password: None,
                new_password: "Reset4dm1n!".to_string(),
                confirm_password: "Reset4dm1n!".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);

        // Moderators reset nobody but themselves
        let err = update_password(
            State(state.clone()),
            Path(peer.id),
            moderator,
            Json(UpdatePasswordRequest {
                old_password: None,
                new_password: "Reset4dm1n!".to_string(),
                confirm_password: "Reset4dm1n!".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_password_mismatch_is_a_validation_error() {
        let state = test_state().await;
        let requester = seed(&state, "root@example.com", Role::SuperAdmin).await;
        let target = seed(&state, "mod@example.com", Role::Moderator).await;

        let err = update_password(
            State(state.clone()),
            Path(target.id),
            requester,
            Json(UpdatePasswordRequest {
                old_password: None,
                new_password: "Replace1!pw".to_string(),
                confirm_password: "Different1!".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }
}
