use time::macros::date;
use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;

const SUPERUSER_NAME: &str = "Administrator";
const SUPERUSER_CPF: &str = "000.000.000-00";

pub(crate) async fn ensure_superuser(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_superuser_password.is_empty() {
        tracing::warn!("FIRST_SUPERUSER_PASSWORD not configured; skipping superuser creation");
        return Ok(());
    }

    let email = admin.first_superuser_email.as_str();
    let now = primitive_now_utc();

    if let Some(user) = repositories::users::find_by_email(state.db(), email).await? {
        let verified =
            security::verify_password(&admin.first_superuser_password, &user.hashed_password)
                .unwrap_or(false);
        if !verified {
            let hashed = security::hash_password(&admin.first_superuser_password)?;
            repositories::users::update_password(state.db(), &user.id, &hashed, now).await?;
        }
        if !user.is_admin {
            repositories::users::set_admin(state.db(), &user.id, true, now).await?;
        }

        if verified && user.is_admin {
            tracing::info!("Default superuser already up to date");
        } else {
            tracing::info!(email, "Updated default superuser");
        }
        return Ok(());
    }

    let hashed_password = security::hash_password(&admin.first_superuser_password)?;
    let id = Uuid::new_v4().to_string();
    repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &id,
            full_name: SUPERUSER_NAME,
            email,
            cpf: SUPERUSER_CPF,
            birth_date: date!(1970 - 01 - 01),
            phone: None,
            city: None,
            state: None,
            gender: None,
            education_level: None,
            hashed_password,
            is_admin: true,
            created_at: now,
        },
    )
    .await?;

    tracing::info!(email, "Created default superuser");
    Ok(())
}
