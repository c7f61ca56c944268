use sqlx::PgPool;

use crate::db::models::LessonAttachment;
use crate::db::types::AttachmentKind;

const COLUMNS: &str = "id, lesson_id, display_name, kind, url_or_filename, created_at";

pub(crate) struct CreateAttachment<'a> {
    pub(crate) id: &'a str,
    pub(crate) lesson_id: &'a str,
    pub(crate) display_name: &'a str,
    pub(crate) kind: AttachmentKind,
    pub(crate) url_or_filename: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateAttachment<'_>,
) -> Result<LessonAttachment, sqlx::Error> {
    sqlx::query_as::<_, LessonAttachment>(&format!(
        "INSERT INTO lesson_attachments (id, lesson_id, display_name, kind, url_or_filename, created_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.lesson_id)
    .bind(params.display_name)
    .bind(params.kind)
    .bind(params.url_or_filename)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_for_lesson(
    pool: &PgPool,
    lesson_id: &str,
) -> Result<Vec<LessonAttachment>, sqlx::Error> {
    sqlx::query_as::<_, LessonAttachment>(&format!(
        "SELECT {COLUMNS} FROM lesson_attachments WHERE lesson_id = $1 ORDER BY created_at, id"
    ))
    .bind(lesson_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, attachment_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM lesson_attachments WHERE id = $1")
        .bind(attachment_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
