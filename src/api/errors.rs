use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::learning::LearningError;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    detail: String,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(&'static str),
    Forbidden(&'static str),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    /// The request is well formed but the learner's state does not allow it.
    PreconditionFailed(String),
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PreconditionFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<LearningError> for ApiError {
    fn from(err: LearningError) -> Self {
        match err {
            LearningError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            LearningError::PreconditionFailed(message) => ApiError::PreconditionFailed(message),
            LearningError::Database(err) => ApiError::internal(err, "Database error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            ApiError::Unauthorized(message) | ApiError::Forbidden(message) => message.to_string(),
            ApiError::BadRequest(message)
            | ApiError::NotFound(message)
            | ApiError::Conflict(message)
            | ApiError::PreconditionFailed(message) => message,
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                message
            }
        };

        let mut response =
            (status, Json(ErrorResponse { status: status.as_u16(), detail })).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn learning_errors_map_to_http_statuses() {
        let not_found: ApiError = LearningError::NotFound("Lesson").into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let locked: ApiError =
            LearningError::PreconditionFailed("This lesson is still locked".to_string()).into();
        assert_eq!(locked.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let database: ApiError = LearningError::Database(sqlx::Error::RowNotFound).into();
        assert_eq!(database.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unauthorized_carries_bearer_challenge() {
        let response = ApiError::Unauthorized("Invalid authentication credentials").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).and_then(|v| v.to_str().ok()),
            Some("Bearer")
        );
    }
}
