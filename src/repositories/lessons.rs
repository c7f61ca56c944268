use sqlx::PgPool;

use crate::db::models::Lesson;

const COLUMNS: &str =
    "id, module_id, title, content, has_response_field, position, created_at, updated_at";

pub(crate) struct LessonFields<'a> {
    pub(crate) title: &'a str,
    pub(crate) content: &'a str,
    pub(crate) has_response_field: bool,
    pub(crate) position: Option<i32>,
}

pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    module_id: &str,
    fields: LessonFields<'_>,
    created_at: time::PrimitiveDateTime,
) -> Result<Lesson, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(&format!(
        "INSERT INTO lessons (
            id, module_id, title, content, has_response_field, position, created_at, updated_at
         ) VALUES (
            $1, $2, $3, $4, $5,
            COALESCE($6, (SELECT COALESCE(MAX(position), 0) + 1 FROM lessons WHERE module_id = $2)),
            $7, $7
         )
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(module_id)
    .bind(fields.title)
    .bind(fields.content)
    .bind(fields.has_response_field)
    .bind(fields.position)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, lesson_id: &str) -> Result<Option<Lesson>, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(&format!("SELECT {COLUMNS} FROM lessons WHERE id = $1"))
        .bind(lesson_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn update(
    pool: &PgPool,
    lesson_id: &str,
    fields: LessonFields<'_>,
    updated_at: time::PrimitiveDateTime,
) -> Result<Option<Lesson>, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(&format!(
        "UPDATE lessons
         SET title = $1,
             content = $2,
             has_response_field = $3,
             position = COALESCE($4, position),
             updated_at = $5
         WHERE id = $6
         RETURNING {COLUMNS}",
    ))
    .bind(fields.title)
    .bind(fields.content)
    .bind(fields.has_response_field)
    .bind(fields.position)
    .bind(updated_at)
    .bind(lesson_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, lesson_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM lessons WHERE id = $1")
        .bind(lesson_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn list_ordered(pool: &PgPool, module_id: &str) -> Result<Vec<Lesson>, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(&format!(
        "SELECT {COLUMNS} FROM lessons
         WHERE module_id = $1
         ORDER BY position, created_at, id"
    ))
    .bind(module_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_for_course(pool: &PgPool, course_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*)
         FROM lessons l
         JOIN course_modules m ON m.id = l.module_id
         WHERE m.course_id = $1",
    )
    .bind(course_id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_course_id(pool: &PgPool, lesson_id: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT m.course_id
         FROM lessons l
         JOIN course_modules m ON m.id = l.module_id
         WHERE l.id = $1",
    )
    .bind(lesson_id)
    .fetch_optional(pool)
    .await
}
