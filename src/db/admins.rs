//! Admin account repository.
//!
//! All access to the admins table goes through an explicitly constructed
//! [`AdminStore`] so handlers and the session machinery never touch the pool
//! directly. The store also owns the conditional rotation update that keeps
//! concurrent refresh attempts honest.

use chrono::Utc;

use super::models::{Admin, AdminListQuery, AdminListResponse, AdminResponse, Role};
use super::DbPool;

/// Input for inserting a new admin account
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: Role,
}

/// Repository over the admins table
#[derive(Debug, Clone)]
pub struct AdminStore {
    pool: DbPool,
}

impl AdminStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Admin>, sqlx::Error> {
        sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, sqlx::Error> {
        sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    /// Check whether an email is already used by an account other than `exclude_id`
    pub async fn email_taken(
        &self,
        email: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM admins WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(matches!(existing, Some((id,)) if Some(id) != exclude_id))
    }

    /// Check whether a phone number is already used by an account other than `exclude_id`
    pub async fn phone_taken(
        &self,
        phone: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM admins WHERE phone = ?")
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;
        Ok(matches!(existing, Some((id,)) if Some(id) != exclude_id))
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await
    }

    pub async fn insert(&self, new: NewAdmin) -> Result<Admin, sqlx::Error> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO admins (name, email, phone, password_hash, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.password_hash)
        .bind(new.role.to_string())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }

    /// Paginated listing in stable id order
    pub async fn list(&self, query: &AdminListQuery) -> Result<AdminListResponse, sqlx::Error> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.limit.unwrap_or(10).clamp(1, 100);
        // Saturating: an absurd page value yields an empty page, not a panic
        let offset = page.saturating_sub(1).saturating_mul(per_page);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await?;

        let admins = sqlx::query_as::<_, Admin>(
            "SELECT * FROM admins ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total_pages = (total as f64 / per_page as f64).ceil() as i64;

        Ok(AdminListResponse {
            items: admins.into_iter().map(AdminResponse::from).collect(),
            total,
            page,
            per_page,
            total_pages,
        })
    }

    /// Partial detail update; None leaves the column untouched
    pub async fn update_details(
        &self,
        id: i64,
        name: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        role: Option<Role>,
    ) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE admins SET
                name = COALESCE(?, name),
                email = COALESCE(?, email),
                phone = COALESCE(?, phone),
                role = COALESCE(?, role),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(role.map(|r| r.to_string()))
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Set a new password hash and revoke any live session in one statement
    pub async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "UPDATE admins SET password_hash = ?, refresh_token_hash = NULL, updated_at = ? WHERE id = ?",
        )
        .bind(password_hash)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Store the hash of a freshly issued refresh token
    pub async fn set_refresh_hash(&self, id: i64, hash: &str) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339();

        sqlx::query("UPDATE admins SET refresh_token_hash = ?, updated_at = ? WHERE id = ?")
            .bind(hash)
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Drop any stored session hash. Idempotent.
    pub async fn clear_refresh_hash(&self, id: i64) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339();

        sqlx::query("UPDATE admins SET refresh_token_hash = NULL, updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Swap the stored session hash only if it still matches `old_hash`.
    ///
    /// Returns whether the swap happened. A false return means another
    /// rotation landed first and the caller must treat the attempt as reuse.
    pub async fn rotate_refresh_hash(
        &self,
        id: i64,
        old_hash: &str,
        new_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "UPDATE admins SET refresh_token_hash = ?, updated_at = ? WHERE id = ? AND refresh_token_hash = ?",
        )
        .bind(new_hash)
        .bind(&now)
        .bind(id)
        .bind(old_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
