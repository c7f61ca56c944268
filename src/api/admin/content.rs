use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::validation::validate_attachment_target;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::repositories::lessons::LessonFields;
use crate::schemas::lesson::{AttachmentCreate, AttachmentResponse, LessonResponse, LessonUpsert};
use crate::schemas::module::{ModuleResponse, ModuleUpsert};
use crate::schemas::MessageResponse;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/modules/:module_id", put(update_module).delete(delete_module))
        .route("/modules/:module_id/lessons", get(list_lessons).post(create_lesson))
        .route("/lessons/:lesson_id", get(get_lesson).put(update_lesson).delete(delete_lesson))
        .route("/lessons/:lesson_id/attachments", post(add_attachment))
        .route("/attachments/:attachment_id", delete(delete_attachment))
}

fn lesson_fields(payload: &LessonUpsert) -> LessonFields<'_> {
    LessonFields {
        title: payload.title.trim(),
        content: &payload.content,
        has_response_field: payload.has_response_field,
        position: payload.order,
    }
}

async fn update_module(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(module_id): Path<String>,
    Json(payload): Json<ModuleUpsert>,
) -> Result<Json<ModuleResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let module = repositories::modules::update(
        state.db(),
        &module_id,
        payload.title.trim(),
        payload.order,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update module"))?
    .ok_or_else(|| ApiError::NotFound("Module not found".to_string()))?;

    tracing::info!(admin_id = %admin.id, module_id = %module_id, action = "update_module", "Module updated");
    Ok(Json(ModuleResponse::from_db(module)))
}

async fn delete_module(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(module_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::modules::delete(state.db(), &module_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete module"))?;
    if !deleted {
        return Err(ApiError::NotFound("Module not found".to_string()));
    }

    tracing::info!(admin_id = %admin.id, module_id = %module_id, action = "delete_module", "Module deleted");
    Ok(Json(MessageResponse::new("Module deleted")))
}

async fn list_lessons(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(module_id): Path<String>,
) -> Result<Json<Vec<LessonResponse>>, ApiError> {
    let lessons = repositories::lessons::list_ordered(state.db(), &module_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list lessons"))?;
    Ok(Json(lessons.into_iter().map(LessonResponse::from_db).collect()))
}

async fn create_lesson(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(module_id): Path<String>,
    Json(payload): Json<LessonUpsert>,
) -> Result<(StatusCode, Json<LessonResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    repositories::modules::find_by_id(state.db(), &module_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch module"))?
        .ok_or_else(|| ApiError::NotFound("Module not found".to_string()))?;

    let lesson = repositories::lessons::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        &module_id,
        lesson_fields(&payload),
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create lesson"))?;

    tracing::info!(
        admin_id = %admin.id,
        module_id = %module_id,
        lesson_id = %lesson.id,
        action = "create_lesson",
        "Lesson created"
    );
    Ok((StatusCode::CREATED, Json(LessonResponse::from_db(lesson))))
}

async fn get_lesson(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(lesson_id): Path<String>,
) -> Result<Json<LessonResponse>, ApiError> {
    let lesson = repositories::lessons::find_by_id(state.db(), &lesson_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch lesson"))?
        .ok_or_else(|| ApiError::NotFound("Lesson not found".to_string()))?;
    Ok(Json(LessonResponse::from_db(lesson)))
}

async fn update_lesson(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(lesson_id): Path<String>,
    Json(payload): Json<LessonUpsert>,
) -> Result<Json<LessonResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let lesson = repositories::lessons::update(
        state.db(),
        &lesson_id,
        lesson_fields(&payload),
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update lesson"))?
    .ok_or_else(|| ApiError::NotFound("Lesson not found".to_string()))?;

    tracing::info!(admin_id = %admin.id, lesson_id = %lesson_id, action = "update_lesson", "Lesson updated");
    Ok(Json(LessonResponse::from_db(lesson)))
}

async fn delete_lesson(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(lesson_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::lessons::delete(state.db(), &lesson_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete lesson"))?;
    if !deleted {
        return Err(ApiError::NotFound("Lesson not found".to_string()));
    }

    tracing::info!(admin_id = %admin.id, lesson_id = %lesson_id, action = "delete_lesson", "Lesson deleted");
    Ok(Json(MessageResponse::new("Lesson deleted")))
}

async fn add_attachment(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(lesson_id): Path<String>,
    Json(payload): Json<AttachmentCreate>,
) -> Result<(StatusCode, Json<AttachmentResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let target = payload.target.trim();
    validate_attachment_target(payload.kind, target, state.allowed_extensions())?;

    repositories::lessons::find_by_id(state.db(), &lesson_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch lesson"))?
        .ok_or_else(|| ApiError::NotFound("Lesson not found".to_string()))?;

    let attachment = repositories::attachments::create(
        state.db(),
        repositories::attachments::CreateAttachment {
            id: &Uuid::new_v4().to_string(),
            lesson_id: &lesson_id,
            display_name: payload.display_name.trim(),
            kind: payload.kind,
            url_or_filename: target,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to add attachment"))?;

    tracing::info!(
        admin_id = %admin.id,
        lesson_id = %lesson_id,
        kind = payload.kind.as_str(),
        action = "add_attachment",
        "Attachment added"
    );
    Ok((StatusCode::CREATED, Json(AttachmentResponse::from_db(attachment))))
}

async fn delete_attachment(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(attachment_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::attachments::delete(state.db(), &attachment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete attachment"))?;
    if !deleted {
        return Err(ApiError::NotFound("Attachment not found".to_string()));
    }

    tracing::info!(
        admin_id = %admin.id,
        attachment_id = %attachment_id,
        action = "delete_attachment",
        "Attachment deleted"
    );
    Ok(Json(MessageResponse::new("Attachment deleted")))
}
