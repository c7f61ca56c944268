use std::collections::HashSet;

use sqlx::{PgConnection, PgPool};

use crate::db::models::LessonCompletion;

const COLUMNS: &str = "id, user_id, lesson_id, completed_at";

pub(crate) async fn find(
    pool: &PgPool,
    user_id: &str,
    lesson_id: &str,
) -> Result<Option<LessonCompletion>, sqlx::Error> {
    sqlx::query_as::<_, LessonCompletion>(&format!(
        "SELECT {COLUMNS} FROM lesson_completions WHERE user_id = $1 AND lesson_id = $2"
    ))
    .bind(user_id)
    .bind(lesson_id)
    .fetch_optional(pool)
    .await
}

/// Returns `None` when the lesson was already completed by the user.
pub(crate) async fn insert_if_absent(
    conn: &mut PgConnection,
    id: &str,
    user_id: &str,
    lesson_id: &str,
    completed_at: time::PrimitiveDateTime,
) -> Result<Option<LessonCompletion>, sqlx::Error> {
    sqlx::query_as::<_, LessonCompletion>(&format!(
        "INSERT INTO lesson_completions (id, user_id, lesson_id, completed_at)
         VALUES ($1,$2,$3,$4)
         ON CONFLICT (user_id, lesson_id) DO NOTHING
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(user_id)
    .bind(lesson_id)
    .bind(completed_at)
    .fetch_optional(&mut *conn)
    .await
}

pub(crate) async fn fetch_existing(
    conn: &mut PgConnection,
    user_id: &str,
    lesson_id: &str,
) -> Result<LessonCompletion, sqlx::Error> {
    sqlx::query_as::<_, LessonCompletion>(&format!(
        "SELECT {COLUMNS} FROM lesson_completions WHERE user_id = $1 AND lesson_id = $2"
    ))
    .bind(user_id)
    .bind(lesson_id)
    .fetch_one(&mut *conn)
    .await
}

pub(crate) async fn completed_lesson_ids(
    pool: &PgPool,
    user_id: &str,
) -> Result<HashSet<String>, sqlx::Error> {
    let ids = sqlx::query_scalar::<_, String>(
        "SELECT lesson_id FROM lesson_completions WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(ids.into_iter().collect())
}

pub(crate) async fn count_for_course(
    pool: &PgPool,
    user_id: &str,
    course_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*)
         FROM lesson_completions lc
         JOIN lessons l ON l.id = lc.lesson_id
         JOIN course_modules m ON m.id = l.module_id
         WHERE lc.user_id = $1 AND m.course_id = $2",
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_one(pool)
    .await
}
