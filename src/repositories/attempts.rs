use sqlx::{PgConnection, PgPool};

use crate::db::models::QuizAttempt;

const COLUMNS: &str = "id, user_id, quiz_id, score, attempted_at";

pub(crate) async fn insert(
    conn: &mut PgConnection,
    id: &str,
    user_id: &str,
    quiz_id: &str,
    score: f64,
    attempted_at: time::PrimitiveDateTime,
) -> Result<QuizAttempt, sqlx::Error> {
    sqlx::query_as::<_, QuizAttempt>(&format!(
        "INSERT INTO quiz_attempts (id, user_id, quiz_id, score, attempted_at)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(user_id)
    .bind(quiz_id)
    .bind(score)
    .bind(attempted_at)
    .fetch_one(&mut *conn)
    .await
}

pub(crate) async fn best_for_quiz(
    pool: &PgPool,
    user_id: &str,
    quiz_id: &str,
) -> Result<Option<QuizAttempt>, sqlx::Error> {
    sqlx::query_as::<_, QuizAttempt>(&format!(
        "SELECT {COLUMNS} FROM quiz_attempts
         WHERE user_id = $1 AND quiz_id = $2
         ORDER BY score DESC, attempted_at
         LIMIT 1"
    ))
    .bind(user_id)
    .bind(quiz_id)
    .fetch_optional(pool)
    .await
}
