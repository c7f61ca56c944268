use std::collections::HashMap;

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::core::metrics;
use crate::core::time::{primitive_now_utc, today_utc};
use crate::db::models::{
    Course, CourseAuthorization, Enrollment, LessonAnswer, LessonCompletion, Quiz, QuizAttempt,
    User,
};
use crate::repositories;
use crate::services::certificates::{self, CertificateData, CertificateInput};
use crate::services::progression::{self, Eligibility, ModuleView, PASSING_SCORE};
use crate::services::quiz_scoring::{self, AnswerKey, ScoringError};

#[derive(Debug, Error)]
pub(crate) enum LearningError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    PreconditionFailed(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<ScoringError> for LearningError {
    fn from(err: ScoringError) -> Self {
        Self::PreconditionFailed(err.to_string())
    }
}

/// Result of an idempotent action: the record and whether this call created it.
#[derive(Debug, Clone)]
pub(crate) enum Outcome<T> {
    Created(T),
    AlreadyExists(T),
}

impl<T> Outcome<T> {
    pub(crate) fn created(&self) -> bool {
        matches!(self, Outcome::Created(_))
    }
}

fn precondition(message: &str) -> LearningError {
    LearningError::PreconditionFailed(message.to_string())
}

async fn find_course(pool: &PgPool, course_id: &str) -> Result<Course, LearningError> {
    repositories::courses::find_by_id(pool, course_id)
        .await?
        .ok_or(LearningError::NotFound("Course"))
}

pub(crate) async fn is_authorized(
    pool: &PgPool,
    user: &User,
    course_id: &str,
) -> Result<bool, LearningError> {
    if user.is_admin {
        return Ok(true);
    }
    Ok(repositories::authorizations::exists(pool, &user.id, course_id).await?)
}

pub(crate) async fn require_enrollment(
    pool: &PgPool,
    user_id: &str,
    course_id: &str,
) -> Result<Enrollment, LearningError> {
    repositories::enrollments::find(pool, user_id, course_id)
        .await?
        .ok_or_else(|| precondition("You must be enrolled in this course"))
}

pub(crate) async fn enroll(
    pool: &PgPool,
    user: &User,
    course_id: &str,
) -> Result<Outcome<Enrollment>, LearningError> {
    find_course(pool, course_id).await?;
    if !is_authorized(pool, user, course_id).await? {
        return Err(precondition("You are not authorized to enroll in this course"));
    }

    let mut tx = pool.begin().await?;
    let id = Uuid::new_v4().to_string();
    let inserted = repositories::enrollments::insert_if_absent(
        &mut tx,
        &id,
        &user.id,
        course_id,
        primitive_now_utc(),
    )
    .await?;
    let outcome = match inserted {
        Some(enrollment) => Outcome::Created(enrollment),
        None => Outcome::AlreadyExists(
            repositories::enrollments::fetch_existing(&mut tx, &user.id, course_id).await?,
        ),
    };
    tx.commit().await?;

    metrics::record_enrollment(outcome.created());
    if outcome.created() {
        tracing::info!(user_id = %user.id, course_id, "Student enrolled");
    }
    Ok(outcome)
}

pub(crate) async fn complete_lesson(
    pool: &PgPool,
    enforce_locks: bool,
    user: &User,
    lesson_id: &str,
) -> Result<Outcome<LessonCompletion>, LearningError> {
    let course_id = repositories::lessons::find_course_id(pool, lesson_id)
        .await?
        .ok_or(LearningError::NotFound("Lesson"))?;
    require_enrollment(pool, &user.id, &course_id).await?;

    if let Some(existing) = repositories::completions::find(pool, &user.id, lesson_id).await? {
        metrics::record_lesson_completion(false);
        return Ok(Outcome::AlreadyExists(existing));
    }

    if enforce_locks {
        let structure = progression::compute_structure(pool, &course_id, &user.id).await?;
        let locked = progression::find_lesson(&structure, lesson_id)
            .map(|view| view.is_locked)
            .unwrap_or(true);
        if locked {
            return Err(precondition("This lesson is still locked"));
        }
    }

    let mut tx = pool.begin().await?;
    let id = Uuid::new_v4().to_string();
    let inserted = repositories::completions::insert_if_absent(
        &mut tx,
        &id,
        &user.id,
        lesson_id,
        primitive_now_utc(),
    )
    .await?;
    let outcome = match inserted {
        Some(completion) => Outcome::Created(completion),
        None => Outcome::AlreadyExists(
            repositories::completions::fetch_existing(&mut tx, &user.id, lesson_id).await?,
        ),
    };
    tx.commit().await?;

    metrics::record_lesson_completion(outcome.created());
    tracing::info!(
        user_id = %user.id,
        lesson_id,
        created = outcome.created(),
        "Lesson completion recorded"
    );
    Ok(outcome)
}

pub(crate) async fn submit_answer(
    pool: &PgPool,
    user: &User,
    lesson_id: &str,
    text: &str,
) -> Result<LessonAnswer, LearningError> {
    let lesson = repositories::lessons::find_by_id(pool, lesson_id)
        .await?
        .ok_or(LearningError::NotFound("Lesson"))?;
    let course_id = repositories::lessons::find_course_id(pool, lesson_id)
        .await?
        .ok_or(LearningError::NotFound("Lesson"))?;
    require_enrollment(pool, &user.id, &course_id).await?;

    if !lesson.has_response_field {
        return Err(precondition("This lesson does not accept answers"));
    }

    let mut tx = pool.begin().await?;
    let id = Uuid::new_v4().to_string();
    let inserted = repositories::answers::insert_if_absent(
        &mut tx,
        &id,
        &user.id,
        lesson_id,
        text,
        primitive_now_utc(),
    )
    .await?;
    let Some(answer) = inserted else {
        return Err(precondition("You have already answered this lesson"));
    };
    tx.commit().await?;

    tracing::info!(user_id = %user.id, lesson_id, "Lesson answer submitted");
    Ok(answer)
}

#[derive(Debug, Clone)]
pub(crate) struct QuizResult {
    pub(crate) attempt: QuizAttempt,
    pub(crate) passed: bool,
    pub(crate) best_score: f64,
}

pub(crate) async fn submit_quiz(
    pool: &PgPool,
    enforce_locks: bool,
    user: &User,
    quiz_id: &str,
    answers: &HashMap<String, String>,
) -> Result<QuizResult, LearningError> {
    let quiz = repositories::quizzes::find_by_id(pool, quiz_id)
        .await?
        .ok_or(LearningError::NotFound("Quiz"))?;
    let course_id = repositories::quizzes::find_course_id(pool, quiz_id)
        .await?
        .ok_or(LearningError::NotFound("Quiz"))?;
    require_enrollment(pool, &user.id, &course_id).await?;

    if enforce_locks {
        let structure = progression::compute_structure(pool, &course_id, &user.id).await?;
        let locked = progression::find_module(&structure, &quiz.module_id)
            .map(|view| view.is_locked)
            .unwrap_or(true);
        if locked {
            return Err(precondition("This quiz is still locked"));
        }
    }

    let key: Vec<AnswerKey> = repositories::quizzes::answer_key(pool, quiz_id)
        .await?
        .into_iter()
        .map(AnswerKey::from)
        .collect();
    let score = quiz_scoring::score_attempt(&key, answers)?;

    let previous_best = repositories::attempts::best_for_quiz(pool, &user.id, quiz_id)
        .await?
        .map(|attempt| attempt.score);

    let mut tx = pool.begin().await?;
    let id = Uuid::new_v4().to_string();
    let attempt =
        repositories::attempts::insert(&mut tx, &id, &user.id, quiz_id, score, primitive_now_utc())
            .await?;
    tx.commit().await?;

    let passed = score >= PASSING_SCORE;
    metrics::record_quiz_attempt(passed);
    tracing::info!(user_id = %user.id, quiz_id, score, passed, "Quiz attempt recorded");

    Ok(QuizResult {
        attempt,
        passed,
        best_score: previous_best.map_or(score, |best| best.max(score)),
    })
}

/// Progress view of a course for one student.
#[derive(Debug, Clone)]
pub(crate) struct CourseProgress {
    pub(crate) course: Course,
    pub(crate) authorized: bool,
    pub(crate) enrollment: Option<Enrollment>,
    pub(crate) structure: Vec<ModuleView>,
    pub(crate) quizzes: Vec<Quiz>,
    pub(crate) eligibility: Option<Eligibility>,
}

pub(crate) async fn course_progress(
    pool: &PgPool,
    user: &User,
    course_id: &str,
) -> Result<CourseProgress, LearningError> {
    let course = find_course(pool, course_id).await?;
    let authorized = is_authorized(pool, user, course_id).await?;
    let enrollment = repositories::enrollments::find(pool, &user.id, course_id).await?;

    let (structure, quizzes, eligibility) = if enrollment.is_some() {
        let structure = progression::compute_structure(pool, course_id, &user.id).await?;
        let quizzes = repositories::quizzes::list_for_course(pool, course_id).await?;
        let eligibility = progression::compute_eligibility(pool, course_id, &user.id).await?;
        (structure, quizzes, Some(eligibility))
    } else {
        (Vec::new(), Vec::new(), None)
    };

    Ok(CourseProgress { course, authorized, enrollment, structure, quizzes, eligibility })
}

pub(crate) async fn issue_certificate(
    pool: &PgPool,
    user: &User,
    course_id: &str,
) -> Result<CertificateData, LearningError> {
    let course = find_course(pool, course_id).await?;
    require_enrollment(pool, &user.id, course_id).await?;

    let eligibility = progression::compute_eligibility(pool, course_id, &user.id).await?;
    if !eligibility.eligible {
        return Err(precondition(
            "Complete every lesson and pass every quiz to earn the certificate",
        ));
    }

    let data = certificates::build_certificate(CertificateInput {
        user_id: &user.id,
        student_name: &user.full_name,
        student_cpf: &user.cpf,
        course_id,
        course_title: &course.title,
        course_load: course.course_load,
        completion_date: today_utc(),
    });

    metrics::record_certificate_issued();
    tracing::info!(user_id = %user.id, course_id, "Certificate issued");
    Ok(data)
}

pub(crate) async fn authorize_student(
    pool: &PgPool,
    admin: &User,
    course_id: &str,
    email: &str,
) -> Result<Outcome<CourseAuthorization>, LearningError> {
    find_course(pool, course_id).await?;
    let student = repositories::users::find_by_email(pool, email)
        .await?
        .ok_or(LearningError::NotFound("User"))?;

    let mut tx = pool.begin().await?;
    let id = Uuid::new_v4().to_string();
    let inserted = repositories::authorizations::insert_if_absent(
        &mut tx,
        repositories::authorizations::GrantAuthorization {
            id: &id,
            user_id: &student.id,
            course_id,
            granted_by: Some(&admin.id),
            granted_at: primitive_now_utc(),
        },
    )
    .await?;
    let outcome = match inserted {
        Some(authorization) => Outcome::Created(authorization),
        None => Outcome::AlreadyExists(
            repositories::authorizations::fetch_existing(&mut tx, &student.id, course_id).await?,
        ),
    };
    tx.commit().await?;

    tracing::info!(
        admin_id = %admin.id,
        user_id = %student.id,
        course_id,
        created = outcome.created(),
        action = "authorize_student",
        "Course authorization granted"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_reports_creation() {
        let created = Outcome::Created(1);
        let existing = Outcome::AlreadyExists(2);
        assert!(created.created());
        assert!(!existing.created());
    }

    #[test]
    fn empty_quiz_becomes_precondition_failure() {
        let err = LearningError::from(ScoringError::EmptyQuiz);
        assert!(matches!(err, LearningError::PreconditionFailed(message) if message.contains("no questions")));
    }
}
