use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::validation;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::lesson::{
    AnswerResponse, AnswerSubmit, AttachmentResponse, CompletionResponse, LessonDetailResponse,
    LessonResponse,
};
use crate::services::learning::{self, Outcome};
use crate::services::progression;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:lesson_id", get(lesson_detail))
        .route("/:lesson_id/complete", post(complete_lesson))
        .route("/:lesson_id/response", post(submit_answer))
}

async fn lesson_detail(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(lesson_id): Path<String>,
) -> Result<Json<LessonDetailResponse>, ApiError> {
    let lesson = repositories::lessons::find_by_id(state.db(), &lesson_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch lesson"))?
        .ok_or_else(|| ApiError::NotFound("Lesson not found".to_string()))?;
    let course_id = repositories::lessons::find_course_id(state.db(), &lesson_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to resolve lesson course"))?
        .ok_or_else(|| ApiError::NotFound("Lesson not found".to_string()))?;

    learning::require_enrollment(state.db(), &user.id, &course_id).await?;

    let structure = progression::compute_structure(state.db(), &course_id, &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to compute course progress"))?;
    let is_locked =
        progression::find_lesson(&structure, &lesson_id).map_or(true, |view| view.is_locked);

    let completion = repositories::completions::find(state.db(), &user.id, &lesson_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch completion"))?;
    let answer = repositories::answers::find(state.db(), &user.id, &lesson_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch lesson answer"))?;
    let attachments = repositories::attachments::list_for_lesson(state.db(), &lesson_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list attachments"))?;

    Ok(Json(LessonDetailResponse {
        lesson: LessonResponse::from_db(lesson),
        course_id,
        is_locked,
        completed_at: completion
            .map(|completion| crate::core::time::format_primitive(completion.completed_at)),
        answer: answer.map(AnswerResponse::from_db),
        attachments: attachments.into_iter().map(AttachmentResponse::from_db).collect(),
    }))
}

async fn complete_lesson(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(lesson_id): Path<String>,
) -> Result<(StatusCode, Json<CompletionResponse>), ApiError> {
    let enforce = state.enforce_locks();
    let response = match learning::complete_lesson(state.db(), enforce, &user, &lesson_id).await? {
        Outcome::Created(completion) => (
            StatusCode::CREATED,
            Json(CompletionResponse::from_db(completion, "Lesson completed")),
        ),
        Outcome::AlreadyExists(completion) => (
            StatusCode::OK,
            Json(CompletionResponse::from_db(completion, "Lesson was already completed")),
        ),
    };
    Ok(response)
}

async fn submit_answer(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(lesson_id): Path<String>,
    Json(payload): Json<AnswerSubmit>,
) -> Result<(StatusCode, Json<AnswerResponse>), ApiError> {
    let text = validation::normalize_answer_text(&payload.text)?;
    let answer = learning::submit_answer(state.db(), &user, &lesson_id, text).await?;
    Ok((StatusCode::CREATED, Json(AnswerResponse::from_db(answer))))
}
