use sqlx::{PgConnection, PgPool};

use crate::db::models::Enrollment;

const COLUMNS: &str = "id, user_id, course_id, enrolled_at";

pub(crate) async fn find(
    pool: &PgPool,
    user_id: &str,
    course_id: &str,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {COLUMNS} FROM enrollments WHERE user_id = $1 AND course_id = $2"
    ))
    .bind(user_id)
    .bind(course_id)
    .fetch_optional(pool)
    .await
}

/// Returns `None` when the pair is already enrolled.
pub(crate) async fn insert_if_absent(
    conn: &mut PgConnection,
    id: &str,
    user_id: &str,
    course_id: &str,
    enrolled_at: time::PrimitiveDateTime,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "INSERT INTO enrollments (id, user_id, course_id, enrolled_at)
         VALUES ($1,$2,$3,$4)
         ON CONFLICT (user_id, course_id) DO NOTHING
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(user_id)
    .bind(course_id)
    .bind(enrolled_at)
    .fetch_optional(&mut *conn)
    .await
}

pub(crate) async fn fetch_existing(
    conn: &mut PgConnection,
    user_id: &str,
    course_id: &str,
) -> Result<Enrollment, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {COLUMNS} FROM enrollments WHERE user_id = $1 AND course_id = $2"
    ))
    .bind(user_id)
    .bind(course_id)
    .fetch_one(&mut *conn)
    .await
}
