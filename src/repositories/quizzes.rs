use sqlx::{PgConnection, PgPool};

use crate::db::models::{Choice, Question, Quiz};

const QUIZ_COLUMNS: &str = "id, module_id, title, created_at";
const QUESTION_COLUMNS: &str = "id, quiz_id, text, created_at";
const CHOICE_COLUMNS: &str = "id, question_id, position, text, is_correct";

pub(crate) const CHOICES_PER_QUESTION: usize = 3;

pub(crate) async fn find_by_id(pool: &PgPool, quiz_id: &str) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1"))
        .bind(quiz_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_module(pool: &PgPool, module_id: &str) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE module_id = $1"))
        .bind(module_id)
        .fetch_optional(pool)
        .await
}

/// Returns the module's quiz and whether this call created it.
pub(crate) async fn ensure_for_module(
    pool: &PgPool,
    id: &str,
    module_id: &str,
    title: &str,
    created_at: time::PrimitiveDateTime,
) -> Result<(Quiz, bool), sqlx::Error> {
    let inserted = sqlx::query_as::<_, Quiz>(&format!(
        "INSERT INTO quizzes (id, module_id, title, created_at)
         VALUES ($1,$2,$3,$4)
         ON CONFLICT (module_id) DO NOTHING
         RETURNING {QUIZ_COLUMNS}",
    ))
    .bind(id)
    .bind(module_id)
    .bind(title)
    .bind(created_at)
    .fetch_optional(pool)
    .await?;

    match inserted {
        Some(quiz) => Ok((quiz, true)),
        None => {
            let quiz = sqlx::query_as::<_, Quiz>(&format!(
                "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE module_id = $1"
            ))
            .bind(module_id)
            .fetch_one(pool)
            .await?;
            Ok((quiz, false))
        }
    }
}

/// Quizzes of the course in module order.
pub(crate) async fn list_for_course(pool: &PgPool, course_id: &str) -> Result<Vec<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(
        "SELECT q.id, q.module_id, q.title, q.created_at
         FROM quizzes q
         JOIN course_modules m ON m.id = q.module_id
         WHERE m.course_id = $1
         ORDER BY m.position, m.created_at, m.id",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_course_id(pool: &PgPool, quiz_id: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT m.course_id
         FROM quizzes q
         JOIN course_modules m ON m.id = q.module_id
         WHERE q.id = $1",
    )
    .bind(quiz_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_questions(pool: &PgPool, quiz_id: &str) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE quiz_id = $1 ORDER BY created_at, id"
    ))
    .bind(quiz_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_choices(pool: &PgPool, quiz_id: &str) -> Result<Vec<Choice>, sqlx::Error> {
    sqlx::query_as::<_, Choice>(
        "SELECT c.id, c.question_id, c.position, c.text, c.is_correct
         FROM choices c
         JOIN questions q ON q.id = c.question_id
         WHERE q.quiz_id = $1
         ORDER BY c.question_id, c.position",
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn choices_for_question(
    conn: &mut PgConnection,
    question_id: &str,
) -> Result<Vec<Choice>, sqlx::Error> {
    sqlx::query_as::<_, Choice>(&format!(
        "SELECT {CHOICE_COLUMNS} FROM choices WHERE question_id = $1 ORDER BY position"
    ))
    .bind(question_id)
    .fetch_all(&mut *conn)
    .await
}

/// `correct_position` is 1-based.
pub(crate) async fn insert_question(
    conn: &mut PgConnection,
    question_id: &str,
    quiz_id: &str,
    text: &str,
    choices: &[String; CHOICES_PER_QUESTION],
    correct_position: i16,
    created_at: time::PrimitiveDateTime,
) -> Result<Question, sqlx::Error> {
    let question = sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (id, quiz_id, text, created_at)
         VALUES ($1,$2,$3,$4)
         RETURNING {QUESTION_COLUMNS}",
    ))
    .bind(question_id)
    .bind(quiz_id)
    .bind(text)
    .bind(created_at)
    .fetch_one(&mut *conn)
    .await?;

    for (position, choice_text) in (1_i16..).zip(choices.iter()) {
        sqlx::query(
            "INSERT INTO choices (id, question_id, position, text, is_correct)
             VALUES ($1,$2,$3,$4,$5)",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(question_id)
        .bind(position)
        .bind(choice_text)
        .bind(position == correct_position)
        .execute(&mut *conn)
        .await?;
    }

    Ok(question)
}

/// Clears every correct flag before setting the new one so the
/// one-correct-choice index never sees two.
pub(crate) async fn update_question(
    conn: &mut PgConnection,
    question_id: &str,
    text: &str,
    choices: &[String; CHOICES_PER_QUESTION],
    correct_position: i16,
) -> Result<Option<Question>, sqlx::Error> {
    let question = sqlx::query_as::<_, Question>(&format!(
        "UPDATE questions SET text = $1 WHERE id = $2 RETURNING {QUESTION_COLUMNS}"
    ))
    .bind(text)
    .bind(question_id)
    .fetch_optional(&mut *conn)
    .await?;
    let Some(question) = question else {
        return Ok(None);
    };

    sqlx::query("UPDATE choices SET is_correct = FALSE WHERE question_id = $1")
        .bind(question_id)
        .execute(&mut *conn)
        .await?;

    for (position, choice_text) in (1_i16..).zip(choices.iter()) {
        sqlx::query("UPDATE choices SET text = $1 WHERE question_id = $2 AND position = $3")
            .bind(choice_text)
            .bind(question_id)
            .bind(position)
            .execute(&mut *conn)
            .await?;
    }

    sqlx::query("UPDATE choices SET is_correct = TRUE WHERE question_id = $1 AND position = $2")
        .bind(question_id)
        .bind(correct_position)
        .execute(&mut *conn)
        .await?;

    Ok(Some(question))
}

pub(crate) async fn delete_question(pool: &PgPool, question_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(question_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// `(question_id, correct_choice_id)` for every question of the quiz.
pub(crate) async fn answer_key(
    pool: &PgPool,
    quiz_id: &str,
) -> Result<Vec<(String, Option<String>)>, sqlx::Error> {
    sqlx::query_as::<_, (String, Option<String>)>(
        "SELECT q.id, c.id
         FROM questions q
         LEFT JOIN choices c ON c.question_id = q.id AND c.is_correct
         WHERE q.quiz_id = $1
         ORDER BY q.created_at, q.id",
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await
}
