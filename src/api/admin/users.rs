use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::pagination::{PageQuery, PaginatedResponse};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::user::UserResponse;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:user_id/promote", post(promote_user))
        .route("/users/:user_id/demote", post(demote_user))
}

async fn list_users(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<UserResponse>>, ApiError> {
    let users = repositories::users::list(state.db(), query.offset(), query.per_page())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list users"))?;
    let total = repositories::users::count(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count users"))?;
    let items = users.into_iter().map(UserResponse::from_db).collect();
    Ok(Json(PaginatedResponse::new(items, total, &query)))
}

async fn promote_user(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    set_admin_flag(&state, &admin.id, &user_id, true).await
}

async fn demote_user(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    if admin.id == user_id {
        return Err(ApiError::BadRequest("You cannot remove your own admin access".to_string()));
    }
    set_admin_flag(&state, &admin.id, &user_id, false).await
}

async fn set_admin_flag(
    state: &AppState,
    admin_id: &str,
    user_id: &str,
    is_admin: bool,
) -> Result<Json<UserResponse>, ApiError> {
    let user = repositories::users::set_admin(state.db(), user_id, is_admin, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(
        admin_id,
        user_id,
        is_admin,
        action = if is_admin { "promote_user" } else { "demote_user" },
        "Admin flag changed"
    );
    Ok(Json(UserResponse::from_db(user)))
}
