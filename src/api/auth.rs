use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::validation::{
    normalize_cpf, normalize_state, parse_birth_date, validate_education_level, validate_gender,
    validate_password_len,
};
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::User;
use crate::repositories;
use crate::schemas::auth::{ChangePasswordRequest, LoginRequest, TokenResponse};
use crate::schemas::user::{UserRegister, UserResponse};
use crate::schemas::MessageResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/change-password", post(change_password))
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<UserRegister>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    validate_password_len(&payload.password)?;
    let cpf = normalize_cpf(&payload.cpf)?;
    let birth_date = parse_birth_date(&payload.birth_date)?;
    let uf = normalize_state(&payload.state)?;
    let gender = payload.gender.as_deref().map(str::trim).filter(|value| !value.is_empty());
    validate_gender(gender)?;
    validate_education_level(&payload.education_level)?;

    let email = payload.email.trim().to_ascii_lowercase();

    let email_taken = repositories::users::email_taken(state.db(), &email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing email"))?;
    if email_taken {
        return Err(ApiError::Conflict("This email is already registered".to_string()));
    }

    let cpf_taken = repositories::users::cpf_taken(state.db(), &cpf)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing CPF"))?;
    if cpf_taken {
        return Err(ApiError::Conflict("This CPF is already registered".to_string()));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let user = repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            full_name: payload.full_name.trim(),
            email: &email,
            cpf: &cpf,
            birth_date,
            phone: payload.phone.as_deref().map(str::trim).filter(|value| !value.is_empty()),
            city: Some(payload.city.trim()),
            state: Some(&uf),
            gender,
            education_level: Some(&payload.education_level),
            hashed_password,
            is_admin: false,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| {
        if crate::db::is_unique_violation(&e) {
            ApiError::Conflict("This email or CPF is already registered".to_string())
        } else {
            ApiError::internal(e, "Failed to create user")
        }
    })?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(token_response(&state, user)?)))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = repositories::users::find_by_email(state.db(), payload.email.trim())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?
        .ok_or(ApiError::Unauthorized("Incorrect email or password"))?;

    let verified = security::verify_password(&payload.password, &user.hashed_password)
        .map_err(|_| ApiError::Unauthorized("Incorrect email or password"))?;
    if !verified {
        return Err(ApiError::Unauthorized("Incorrect email or password"));
    }

    Ok(Json(token_response(&state, user)?))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from_db(user))
}

async fn change_password(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    validate_password_len(&payload.new_password)?;

    let verified = security::verify_password(&payload.current_password, &user.hashed_password)
        .unwrap_or(false);
    if !verified {
        return Err(ApiError::BadRequest("Current password is incorrect".to_string()));
    }

    let hashed = security::hash_password(&payload.new_password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;
    repositories::users::update_password(state.db(), &user.id, &hashed, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update password"))?;

    tracing::info!(user_id = %user.id, "Password changed");
    Ok(Json(MessageResponse::new("Password updated")))
}

fn token_response(state: &AppState, user: User) -> Result<TokenResponse, ApiError> {
    let access_token = security::create_access_token(&user.id, state.settings(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;
    Ok(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        user: UserResponse::from_db(user),
    })
}
