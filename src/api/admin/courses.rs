use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::pagination::{PageQuery, PaginatedResponse};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::repositories::courses::CourseFields;
use crate::schemas::course::{
    AuthorizationResponse, AuthorizeRequest, AuthorizedStudentResponse, CourseResponse,
    CourseUpsert,
};
use crate::schemas::module::{ModuleResponse, ModuleUpsert};
use crate::schemas::MessageResponse;
use crate::services::learning::{self, Outcome};

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/:course_id",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route(
            "/courses/:course_id/authorizations",
            get(list_authorizations).post(authorize_student),
        )
        .route("/authorizations/:authorization_id", delete(revoke_authorization))
        .route("/courses/:course_id/modules", get(list_modules).post(create_module))
}

fn course_fields(payload: &CourseUpsert) -> CourseFields<'_> {
    CourseFields {
        title: payload.title.trim(),
        description: payload.description.trim(),
        course_load: payload.course_load,
    }
}

async fn list_courses(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<CourseResponse>>, ApiError> {
    let courses = repositories::courses::list(state.db(), query.offset(), query.per_page())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list courses"))?;
    let total = repositories::courses::count(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count courses"))?;
    let items = courses.into_iter().map(CourseResponse::from_db).collect();
    Ok(Json(PaginatedResponse::new(items, total, &query)))
}

async fn create_course(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<CourseUpsert>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let course = repositories::courses::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        course_fields(&payload),
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create course"))?;

    tracing::info!(admin_id = %admin.id, course_id = %course.id, action = "create_course", "Course created");
    Ok((StatusCode::CREATED, Json(CourseResponse::from_db(course))))
}

async fn get_course(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<CourseResponse>, ApiError> {
    let course = repositories::courses::find_by_id(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;
    Ok(Json(CourseResponse::from_db(course)))
}

async fn update_course(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Json(payload): Json<CourseUpsert>,
) -> Result<Json<CourseResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let course = repositories::courses::update(
        state.db(),
        &course_id,
        course_fields(&payload),
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update course"))?
    .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    tracing::info!(admin_id = %admin.id, course_id = %course_id, action = "update_course", "Course updated");
    Ok(Json(CourseResponse::from_db(course)))
}

async fn delete_course(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::courses::delete(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete course"))?;
    if !deleted {
        return Err(ApiError::NotFound("Course not found".to_string()));
    }

    tracing::info!(admin_id = %admin.id, course_id = %course_id, action = "delete_course", "Course deleted");
    Ok(Json(MessageResponse::new("Course deleted")))
}

async fn list_authorizations(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<AuthorizedStudentResponse>>, ApiError> {
    repositories::courses::find_by_id(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    let views = repositories::authorizations::list_for_course(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list authorizations"))?;
    Ok(Json(views.into_iter().map(AuthorizedStudentResponse::from_view).collect()))
}

async fn authorize_student(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Json(payload): Json<AuthorizeRequest>,
) -> Result<(StatusCode, Json<AuthorizationResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let response =
        match learning::authorize_student(state.db(), &admin, &course_id, payload.email.trim())
            .await?
        {
            Outcome::Created(authorization) => (
                StatusCode::CREATED,
                Json(AuthorizationResponse::from_db(authorization, "Student authorized")),
            ),
            Outcome::AlreadyExists(authorization) => (
                StatusCode::OK,
                Json(AuthorizationResponse::from_db(
                    authorization,
                    "Student was already authorized for this course",
                )),
            ),
        };
    Ok(response)
}

async fn revoke_authorization(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(authorization_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::authorizations::delete(state.db(), &authorization_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to revoke authorization"))?;
    if !deleted {
        return Err(ApiError::NotFound("Authorization not found".to_string()));
    }

    tracing::info!(
        admin_id = %admin.id,
        authorization_id = %authorization_id,
        action = "revoke_authorization",
        "Course authorization revoked"
    );
    Ok(Json(MessageResponse::new("Authorization revoked")))
}

async fn list_modules(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<ModuleResponse>>, ApiError> {
    let modules = repositories::modules::list_ordered(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list modules"))?;
    Ok(Json(modules.into_iter().map(ModuleResponse::from_db).collect()))
}

async fn create_module(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Json(payload): Json<ModuleUpsert>,
) -> Result<(StatusCode, Json<ModuleResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    repositories::courses::find_by_id(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    let module = repositories::modules::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        &course_id,
        payload.title.trim(),
        payload.order,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create module"))?;

    tracing::info!(
        admin_id = %admin.id,
        course_id = %course_id,
        module_id = %module.id,
        action = "create_module",
        "Module created"
    );
    Ok((StatusCode::CREATED, Json(ModuleResponse::from_db(module))))
}
