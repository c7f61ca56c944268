use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::quiz::{QuizResponse, QuizResultResponse, QuizSubmit};
use crate::services::learning;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:quiz_id", get(quiz_detail))
        .route("/:quiz_id/submit", post(submit_quiz))
}

async fn quiz_detail(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Result<Json<QuizResponse>, ApiError> {
    let quiz = repositories::quizzes::find_by_id(state.db(), &quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch quiz"))?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;
    let course_id = repositories::quizzes::find_course_id(state.db(), &quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to resolve quiz course"))?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;

    learning::require_enrollment(state.db(), &user.id, &course_id).await?;

    let questions = repositories::quizzes::list_questions(state.db(), &quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;
    let choices = repositories::quizzes::list_choices(state.db(), &quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list choices"))?;

    Ok(Json(QuizResponse::from_parts(quiz, questions, &choices, false)))
}

async fn submit_quiz(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    Json(payload): Json<QuizSubmit>,
) -> Result<(StatusCode, Json<QuizResultResponse>), ApiError> {
    let enforce = state.enforce_locks();
    let result =
        learning::submit_quiz(state.db(), enforce, &user, &quiz_id, &payload.answers).await?;
    Ok((StatusCode::CREATED, Json(QuizResultResponse::from_result(result))))
}
