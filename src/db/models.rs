use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, PrimitiveDateTime};

use crate::db::types::AttachmentKind;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) full_name: String,
    pub(crate) email: String,
    pub(crate) cpf: String,
    pub(crate) birth_date: Date,
    pub(crate) phone: Option<String>,
    pub(crate) city: Option<String>,
    pub(crate) state: Option<String>,
    pub(crate) gender: Option<String>,
    pub(crate) education_level: Option<String>,
    pub(crate) hashed_password: String,
    pub(crate) is_admin: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Course {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) course_load: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct CourseModule {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) position: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Lesson {
    pub(crate) id: String,
    pub(crate) module_id: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) has_response_field: bool,
    pub(crate) position: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct LessonAttachment {
    pub(crate) id: String,
    pub(crate) lesson_id: String,
    pub(crate) display_name: String,
    pub(crate) kind: AttachmentKind,
    pub(crate) url_or_filename: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct LessonAnswer {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) lesson_id: String,
    pub(crate) answer_text: String,
    pub(crate) answered_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Enrollment {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) course_id: String,
    pub(crate) enrolled_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct LessonCompletion {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) lesson_id: String,
    pub(crate) completed_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Quiz {
    pub(crate) id: String,
    pub(crate) module_id: String,
    pub(crate) title: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Question {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) text: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Choice {
    pub(crate) id: String,
    pub(crate) question_id: String,
    pub(crate) position: i16,
    pub(crate) text: String,
    pub(crate) is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct QuizAttempt {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) quiz_id: String,
    pub(crate) score: f64,
    pub(crate) attempted_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct CourseAuthorization {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) course_id: String,
    pub(crate) granted_by: Option<String>,
    pub(crate) granted_at: PrimitiveDateTime,
}
