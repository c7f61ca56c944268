use sqlx::PgPool;

use crate::db::models::CourseModule;

const COLUMNS: &str = "id, course_id, title, position, created_at, updated_at";

/// A missing position appends the module after the current last one.
pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    course_id: &str,
    title: &str,
    position: Option<i32>,
    created_at: time::PrimitiveDateTime,
) -> Result<CourseModule, sqlx::Error> {
    sqlx::query_as::<_, CourseModule>(&format!(
        "INSERT INTO course_modules (id, course_id, title, position, created_at, updated_at)
         VALUES (
            $1, $2, $3,
            COALESCE($4, (SELECT COALESCE(MAX(position), 0) + 1 FROM course_modules WHERE course_id = $2)),
            $5, $5
         )
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(course_id)
    .bind(title)
    .bind(position)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, module_id: &str) -> Result<Option<CourseModule>, sqlx::Error> {
    sqlx::query_as::<_, CourseModule>(&format!("SELECT {COLUMNS} FROM course_modules WHERE id = $1"))
        .bind(module_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn update(
    pool: &PgPool,
    module_id: &str,
    title: &str,
    position: Option<i32>,
    updated_at: time::PrimitiveDateTime,
) -> Result<Option<CourseModule>, sqlx::Error> {
    sqlx::query_as::<_, CourseModule>(&format!(
        "UPDATE course_modules
         SET title = $1, position = COALESCE($2, position), updated_at = $3
         WHERE id = $4
         RETURNING {COLUMNS}",
    ))
    .bind(title)
    .bind(position)
    .bind(updated_at)
    .bind(module_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, module_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM course_modules WHERE id = $1")
        .bind(module_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn list_ordered(pool: &PgPool, course_id: &str) -> Result<Vec<CourseModule>, sqlx::Error> {
    sqlx::query_as::<_, CourseModule>(&format!(
        "SELECT {COLUMNS} FROM course_modules
         WHERE course_id = $1
         ORDER BY position, created_at, id"
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}
