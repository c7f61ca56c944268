use sqlx::{PgConnection, PgPool};

use crate::db::models::LessonAnswer;

const COLUMNS: &str = "id, user_id, lesson_id, answer_text, answered_at";

pub(crate) async fn find(
    pool: &PgPool,
    user_id: &str,
    lesson_id: &str,
) -> Result<Option<LessonAnswer>, sqlx::Error> {
    sqlx::query_as::<_, LessonAnswer>(&format!(
        "SELECT {COLUMNS} FROM lesson_answers WHERE user_id = $1 AND lesson_id = $2"
    ))
    .bind(user_id)
    .bind(lesson_id)
    .fetch_optional(pool)
    .await
}

/// Returns `None` when an answer already exists for the pair.
pub(crate) async fn insert_if_absent(
    conn: &mut PgConnection,
    id: &str,
    user_id: &str,
    lesson_id: &str,
    answer_text: &str,
    answered_at: time::PrimitiveDateTime,
) -> Result<Option<LessonAnswer>, sqlx::Error> {
    sqlx::query_as::<_, LessonAnswer>(&format!(
        "INSERT INTO lesson_answers (id, user_id, lesson_id, answer_text, answered_at)
         VALUES ($1,$2,$3,$4,$5)
         ON CONFLICT (user_id, lesson_id) DO NOTHING
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(user_id)
    .bind(lesson_id)
    .bind(answer_text)
    .bind(answered_at)
    .fetch_optional(&mut *conn)
    .await
}
