use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::db::models::User;
use crate::repositories;

const INVALID_CREDENTIALS: &str = "Invalid authentication credentials";

/// Any signed-in user, student or admin.
pub(crate) struct CurrentUser(pub(crate) User);

/// Signed-in user with `is_admin` set.
pub(crate) struct CurrentAdmin(pub(crate) User);

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

async fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<User, ApiError> {
    let token = bearer_token(headers).ok_or(ApiError::Unauthorized(INVALID_CREDENTIALS))?;
    let claims = security::verify_token(token, state.settings())
        .map_err(|_| ApiError::Unauthorized(INVALID_CREDENTIALS))?;

    repositories::users::find_by_id(state.db(), &claims.sub)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or(ApiError::Unauthorized("User not found"))
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(&parts.headers, state).await.map(CurrentUser)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(&parts.headers, state).await?;
        if !user.is_admin {
            tracing::warn!(user_id = %user.id, "Non-admin user hit an admin route");
            return Err(ApiError::Forbidden("Admin access required"));
        }
        Ok(CurrentAdmin(user))
    }
}
