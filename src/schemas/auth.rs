use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::schemas::user::UserResponse;

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) token_type: String,
    pub(crate) user: UserResponse,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ChangePasswordRequest {
    pub(crate) current_password: String,
    pub(crate) new_password: String,
    #[validate(must_match(other = "new_password", message = "passwords do not match"))]
    pub(crate) new_password_confirm: String,
}
