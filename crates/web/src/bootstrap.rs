//! Superuser bootstrap from `ADMIN_*` environment variables.

use filmhub_db::models::user::CreateUser;
use filmhub_db::store::Store;

use crate::auth::password::hash_password;
use crate::config::AdminBootstrap;
use crate::error::{AppError, AppResult};

/// Create the configured superuser, or promote the existing account with
/// that username. An existing password is left alone.
pub async fn ensure_superuser(store: &dyn Store, admin: &AdminBootstrap) -> AppResult<()> {
    if let Some(user) = store.find_user_by_username(&admin.username).await? {
        if !user.is_superuser {
            store.set_superuser(user.id, true).await?;
            tracing::info!(
                user_id = user.id,
                username = %user.username,
                "Promoted existing user to superuser"
            );
        }
        return Ok(());
    }

    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let user = store
        .create_user(&CreateUser {
            username: admin.username.clone(),
            first_name: String::new(),
            last_name: String::new(),
            email: admin.email.clone(),
            password_hash,
            is_superuser: true,
        })
        .await?;
    tracing::info!(user_id = user.id, username = %user.username, "Created superuser");
    Ok(())
}
