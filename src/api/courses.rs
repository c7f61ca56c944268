use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::pagination::{PageQuery, PaginatedResponse};
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::certificate::CertificateResponse;
use crate::schemas::course::{CourseDetailResponse, CourseResponse, EnrollmentResponse};
use crate::services::learning::{self, Outcome};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses))
        .route("/mine", get(my_courses))
        .route("/:course_id", get(course_detail))
        .route("/:course_id/enroll", post(enroll))
        .route("/:course_id/certificate", get(certificate))
}

async fn list_courses(
    CurrentUser(_user): CurrentUser,
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

async fn my_courses(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let courses = repositories::courses::list_enrolled(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list enrolled courses"))?;
    Ok(Json(courses.into_iter().map(CourseResponse::from_db).collect()))
}

async fn course_detail(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<CourseDetailResponse>, ApiError> {
    let progress = learning::course_progress(state.db(), &user, &course_id).await?;
    Ok(Json(CourseDetailResponse::from_progress(progress)))
}

async fn enroll(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<(StatusCode, Json<EnrollmentResponse>), ApiError> {
    let response = match learning::enroll(state.db(), &user, &course_id).await? {
        Outcome::Created(enrollment) => (
            StatusCode::CREATED,
            Json(EnrollmentResponse::from_db(enrollment, "Enrollment completed")),
        ),
        Outcome::AlreadyExists(enrollment) => (
            StatusCode::OK,
            Json(EnrollmentResponse::from_db(enrollment, "You are already enrolled in this course")),
        ),
    };
    Ok(response)
}

async fn certificate(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<CertificateResponse>, ApiError> {
    let data = learning::issue_certificate(state.db(), &user, &course_id).await?;
    Ok(Json(CertificateResponse::from_data(data)))
}
