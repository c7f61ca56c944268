use sqlx::PgPool;

use crate::db::models::Course;

const COLUMNS: &str = "id, title, description, course_load, created_at, updated_at";

pub(crate) struct CourseFields<'a> {
    pub(crate) title: &'a str,
    pub(crate) description: &'a str,
    pub(crate) course_load: i32,
}

pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    fields: CourseFields<'_>,
    created_at: time::PrimitiveDateTime,
) -> Result<Course, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "INSERT INTO courses (id, title, description, course_load, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(fields.title)
    .bind(fields.description)
    .bind(fields.course_load)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, course_id: &str) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COLUMNS} FROM courses WHERE id = $1"))
        .bind(course_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn update(
    pool: &PgPool,
    course_id: &str,
    fields: CourseFields<'_>,
    updated_at: time::PrimitiveDateTime,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "UPDATE courses SET title = $1, description = $2, course_load = $3, updated_at = $4
         WHERE id = $5
         RETURNING {COLUMNS}",
    ))
    .bind(fields.title)
    .bind(fields.description)
    .bind(fields.course_load)
    .bind(updated_at)
    .bind(course_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, course_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM courses WHERE id = $1")
        .bind(course_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn list(pool: &PgPool, skip: i64, limit: i64) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COLUMNS} FROM courses ORDER BY title, id OFFSET $1 LIMIT $2"
    ))
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses").fetch_one(pool).await
}

pub(crate) async fn list_enrolled(pool: &PgPool, user_id: &str) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT c.id, c.title, c.description, c.course_load, c.created_at, c.updated_at
         FROM courses c
         JOIN enrollments e ON e.course_id = c.id
         WHERE e.user_id = $1
         ORDER BY c.title, c.id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
