//! Admin account models and API request/response types.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Admin roles with hierarchical permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Day-to-day operations, can manage only their own credentials
    Moderator,
    /// Manages moderator accounts
    Admin,
    /// Unrestricted access to every account
    SuperAdmin,
}

impl Role {
    /// Get the permission level (higher = more permissions)
    pub fn level(&self) -> u8 {
        match self {
            Role::Moderator => 1,
            Role::Admin => 2,
            Role::SuperAdmin => 3,
        }
    }

    /// Check if this role has at least the specified permission level
    pub fn has_at_least(&self, required: Role) -> bool {
        self.level() >= required.level()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Moderator => write!(f, "moderator"),
            Role::Admin => write!(f, "admin"),
            Role::SuperAdmin => write!(f, "super_admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            "super_admin" => Ok(Role::SuperAdmin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        // Unknown strings fall back to the least-privileged role
        s.parse().unwrap_or(Role::Moderator)
    }
}

/// Admin account entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Admin {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: String,
    /// Argon2 hash of the live refresh token; None = no active session
    pub refresh_token_hash: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Admin {
    /// Get the role as a Role enum
    pub fn role_enum(&self) -> Role {
        Role::from(self.role.clone())
    }
}

/// Public projection of an admin account (no credential material)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Admin> for AdminResponse {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            name: admin.name,
            email: admin.email,
            phone: admin.phone,
            role: admin.role,
            created_at: admin.created_at,
            updated_at: admin.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Access and refresh tokens returned by login and refresh
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Request to register a new admin account
#[derive(Debug, Deserialize)]
pub struct RegisterAdminRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub role: String,
}

/// Request to update account details; absent fields are left untouched
#[derive(Debug, Deserialize)]
pub struct UpdateAdminRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
}

/// Request to change an account password. old_password is required when
/// the target is the requester's own account.
#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub old_password: Option<String>,
    pub new_password: String,
    pub confirm_password: String,
}

/// Query parameters for the paginated admin list
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AdminListQuery {
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<i64>,
    /// Items per page (defaults to 10, max 100)
    pub limit: Option<i64>,
}

/// Paginated admin list
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminListResponse {
    pub items: Vec<AdminResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}
