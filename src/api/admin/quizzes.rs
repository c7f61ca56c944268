use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::validation::validate_choices;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::quiz::{QuestionResponse, QuestionUpsert, QuizResponse};
use crate::schemas::MessageResponse;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/modules/:module_id/quiz", post(ensure_quiz).get(get_module_quiz))
        .route("/quizzes/:quiz_id/questions", post(create_question))
        .route("/questions/:question_id", put(update_question).delete(delete_question))
}

async fn quiz_response(state: &AppState, quiz: crate::db::models::Quiz) -> Result<QuizResponse, ApiError> {
    let questions = repositories::quizzes::list_questions(state.db(), &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;
    let choices = repositories::quizzes::list_choices(state.db(), &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list choices"))?;
    Ok(QuizResponse::from_parts(quiz, questions, &choices, true))
}

/// Creates the module's quiz when it does not exist yet.
async fn ensure_quiz(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(module_id): Path<String>,
) -> Result<(StatusCode, Json<QuizResponse>), ApiError> {
    let module = repositories::modules::find_by_id(state.db(), &module_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch module"))?
        .ok_or_else(|| ApiError::NotFound("Module not found".to_string()))?;

    let (quiz, created) = repositories::quizzes::ensure_for_module(
        state.db(),
        &Uuid::new_v4().to_string(),
        &module.id,
        &format!("Assessment: {}", module.title),
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create quiz"))?;

    if created {
        tracing::info!(
            admin_id = %admin.id,
            module_id = %module.id,
            quiz_id = %quiz.id,
            action = "create_quiz",
            "Quiz created"
        );
    }

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(quiz_response(&state, quiz).await?)))
}

async fn get_module_quiz(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(module_id): Path<String>,
) -> Result<Json<QuizResponse>, ApiError> {
    let quiz = repositories::quizzes::find_by_module(state.db(), &module_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch quiz"))?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;
    Ok(Json(quiz_response(&state, quiz).await?))
}

async fn create_question(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    Json(payload): Json<QuestionUpsert>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    validate_choices(&payload.choices)?;

    repositories::quizzes::find_by_id(state.db(), &quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch quiz"))?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;

    let choices = payload.choices.clone().map(|choice| choice.trim().to_string());
    let question_id = Uuid::new_v4().to_string();

    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;
    let question = repositories::quizzes::insert_question(
        &mut tx,
        &question_id,
        &quiz_id,
        payload.text.trim(),
        &choices,
        payload.correct_choice,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create question"))?;
    let stored = repositories::quizzes::choices_for_question(&mut tx, &question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load choices"))?;
    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit question"))?;

    tracing::info!(
        admin_id = %admin.id,
        quiz_id = %quiz_id,
        question_id = %question_id,
        action = "create_question",
        "Question created"
    );
    Ok((StatusCode::CREATED, Json(QuestionResponse::from_db(question, &stored, true))))
}

async fn update_question(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(question_id): Path<String>,
    Json(payload): Json<QuestionUpsert>,
) -> Result<Json<QuestionResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    validate_choices(&payload.choices)?;

    let choices = payload.choices.clone().map(|choice| choice.trim().to_string());

    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;
    let question = repositories::quizzes::update_question(
        &mut tx,
        &question_id,
        payload.text.trim(),
        &choices,
        payload.correct_choice,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update question"))?
    .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))?;
    let stored = repositories::quizzes::choices_for_question(&mut tx, &question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load choices"))?;
    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit question"))?;

    tracing::info!(
        admin_id = %admin.id,
        question_id = %question_id,
        action = "update_question",
        "Question updated"
    );
    Ok(Json(QuestionResponse::from_db(question, &stored, true)))
}

async fn delete_question(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::quizzes::delete_question(state.db(), &question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete question"))?;
    if !deleted {
        return Err(ApiError::NotFound("Question not found".to_string()));
    }

    tracing::info!(
        admin_id = %admin.id,
        question_id = %question_id,
        action = "delete_question",
        "Question deleted"
    );
    Ok(Json(MessageResponse::new("Question deleted")))
}
