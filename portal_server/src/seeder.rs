//! Startup seeding: the first administrator and the school_info row.
//!
//! Idempotent. Existing rows are never modified.

use diesel_async::AsyncPgConnection;

use crate::auth::ROLE_SUPER_ADMIN;
use crate::config::PortalConfig;
use crate::models::school_info::SchoolInfoForm;
use crate::models::user::NewUser;
use crate::services::{school_info_service, user_service};

pub async fn seed(conn: &mut AsyncPgConnection, config: &PortalConfig) -> anyhow::Result<()> {
    seed_admin(conn, config).await?;

    school_info_service::ensure_default(
        conn,
        SchoolInfoForm {
            name: "Our School".to_string(),
            motto: None,
            email: if config.school_notify_email.is_empty() {
                "office@localhost".to_string()
            } else {
                config.school_notify_email.clone()
            },
            phone: String::new(),
            address: String::new(),
            about: None,
            mission: None,
            vision: None,
        },
    )
    .await?;
    Ok(())
}

/// Create the super admin from `ADMIN_EMAIL` / `ADMIN_PASSWORD` if missing.
async fn seed_admin(conn: &mut AsyncPgConnection, config: &PortalConfig) -> anyhow::Result<()> {
    if config.admin_email.is_empty() || config.admin_password.is_empty() {
        tracing::debug!("ADMIN_EMAIL/ADMIN_PASSWORD not set, skipping admin seed");
        return Ok(());
    }

    let email = config.admin_email.trim().to_lowercase();
    if user_service::find_by_email(conn, &email).await?.is_some() {
        return Ok(());
    }

    let password = config.admin_password.clone();
    let password_hash = tokio::task::spawn_blocking(move || crate::auth::hash_password(&password)).await??;
    let user = user_service::create_user(
        conn,
        NewUser {
            full_name: "Administrator".to_string(),
            email,
            password_hash,
            role: ROLE_SUPER_ADMIN.to_string(),
            admission_number: None,
            active: true,
        },
    )
    .await?;
    tracing::info!(user_id = user.id, "Seeded super admin account");
    Ok(())
}
