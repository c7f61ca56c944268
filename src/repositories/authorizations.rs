use sqlx::{PgConnection, PgPool};

use crate::db::models::CourseAuthorization;

const COLUMNS: &str = "id, user_id, course_id, granted_by, granted_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct AuthorizationView {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) user_full_name: String,
    pub(crate) user_email: String,
    pub(crate) course_id: String,
    pub(crate) granted_at: time::PrimitiveDateTime,
}

pub(crate) async fn exists(pool: &PgPool, user_id: &str, course_id: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM course_authorizations WHERE user_id = $1 AND course_id = $2)",
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_one(pool)
    .await
}

pub(crate) struct GrantAuthorization<'a> {
    pub(crate) id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) granted_by: Option<&'a str>,
    pub(crate) granted_at: time::PrimitiveDateTime,
}

/// Returns `None` when the user is already authorized for the course.
pub(crate) async fn insert_if_absent(
    conn: &mut PgConnection,
    params: GrantAuthorization<'_>,
) -> Result<Option<CourseAuthorization>, sqlx::Error> {
    sqlx::query_as::<_, CourseAuthorization>(&format!(
        "INSERT INTO course_authorizations (id, user_id, course_id, granted_by, granted_at)
         VALUES ($1,$2,$3,$4,$5)
         ON CONFLICT (user_id, course_id) DO NOTHING
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.course_id)
    .bind(params.granted_by)
    .bind(params.granted_at)
    .fetch_optional(&mut *conn)
    .await
}

pub(crate) async fn fetch_existing(
    conn: &mut PgConnection,
    user_id: &str,
    course_id: &str,
) -> Result<CourseAuthorization, sqlx::Error> {
    sqlx::query_as::<_, CourseAuthorization>(&format!(
        "SELECT {COLUMNS} FROM course_authorizations WHERE user_id = $1 AND course_id = $2"
    ))
    .bind(user_id)
    .bind(course_id)
    .fetch_one(&mut *conn)
    .await
}

pub(crate) async fn list_for_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<AuthorizationView>, sqlx::Error> {
    sqlx::query_as::<_, AuthorizationView>(
        "SELECT ca.id,
                ca.user_id,
                u.full_name AS user_full_name,
                u.email AS user_email,
                ca.course_id,
                ca.granted_at
         FROM course_authorizations ca
         JOIN users u ON u.id = ca.user_id
         WHERE ca.course_id = $1
         ORDER BY u.full_name, ca.id",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, authorization_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM course_authorizations WHERE id = $1")
        .bind(authorization_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
