//! Bootstrap seeding for the first super admin account.

use anyhow::Result;
use tracing::{info, warn};

use crate::auth::password;
use crate::config::SeedConfig;

use super::admins::{AdminStore, NewAdmin};
use super::models::Role;

/// Create the bootstrap super admin when the store is empty.
///
/// Runs at startup and skips quietly when seeding is disabled or any account
/// already exists, so it can stay enabled across restarts.
pub async fn seed_super_admin(store: &AdminStore, seed: &SeedConfig) -> Result<()> {
    if !seed.enabled {
        return Ok(());
    }

    if store.count().await? > 0 {
        info!("Admin accounts already exist, skipping bootstrap seed");
        return Ok(());
    }

    let (name, email, password) = match (&seed.name, &seed.email, &seed.password) {
        (Some(name), Some(email), Some(password)) => {
            (name.clone(), email.clone(), password.clone())
        }
        _ => {
            warn!("Bootstrap seeding is enabled but name, email or password is missing; skipping");
            return Ok(());
        }
    };

    let password_hash = password::hash_password(password).await?;
    let admin = store
        .insert(NewAdmin {
            name,
            email: email.to_lowercase(),
            phone: seed.phone.clone(),
            password_hash,
            role: Role::SuperAdmin,
        })
        .await?;

    info!("Seeded bootstrap super admin account {}", admin.email);
    Ok(())
}
