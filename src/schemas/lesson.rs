use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Lesson, LessonAnswer, LessonAttachment, LessonCompletion};
use crate::db::types::AttachmentKind;
use crate::services::progression::LessonView;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct LessonUpsert {
    #[validate(length(min = 5, max = 140, message = "title must be 5 to 140 characters"))]
    pub(crate) title: String,
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub(crate) content: String,
    #[serde(default)]
    pub(crate) has_response_field: bool,
    #[serde(default)]
    pub(crate) order: Option<i32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LessonResponse {
    pub(crate) id: String,
    pub(crate) module_id: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) has_response_field: bool,
    pub(crate) order: i32,
}

impl LessonResponse {
    pub(crate) fn from_db(lesson: Lesson) -> Self {
        Self {
            id: lesson.id,
            module_id: lesson.module_id,
            title: lesson.title,
            content: lesson.content,
            has_response_field: lesson.has_response_field,
            order: lesson.position,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LessonSummaryResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) order: i32,
    pub(crate) is_locked: bool,
    pub(crate) is_complete: bool,
}

impl LessonSummaryResponse {
    pub(crate) fn from_view(view: LessonView) -> Self {
        Self {
            id: view.lesson.id,
            title: view.lesson.title,
            order: view.lesson.position,
            is_locked: view.is_locked,
            is_complete: view.is_complete,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LessonDetailResponse {
    pub(crate) lesson: LessonResponse,
    pub(crate) course_id: String,
    pub(crate) is_locked: bool,
    pub(crate) completed_at: Option<String>,
    pub(crate) answer: Option<AnswerResponse>,
    pub(crate) attachments: Vec<AttachmentResponse>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerSubmit {
    /// Checked after trimming by `validation::normalize_answer_text`.
    pub(crate) text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerResponse {
    pub(crate) id: String,
    pub(crate) lesson_id: String,
    pub(crate) text: String,
    pub(crate) answered_at: String,
}

impl AnswerResponse {
    pub(crate) fn from_db(answer: LessonAnswer) -> Self {
        Self {
            id: answer.id,
            lesson_id: answer.lesson_id,
            text: answer.answer_text,
            answered_at: format_primitive(answer.answered_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CompletionResponse {
    pub(crate) message: String,
    pub(crate) lesson_id: String,
    pub(crate) completed_at: String,
}

impl CompletionResponse {
    pub(crate) fn from_db(completion: LessonCompletion, message: &str) -> Self {
        Self {
            message: message.to_string(),
            lesson_id: completion.lesson_id,
            completed_at: format_primitive(completion.completed_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AttachmentCreate {
    #[validate(length(min = 1, max = 140, message = "display_name must be 1 to 140 characters"))]
    pub(crate) display_name: String,
    pub(crate) kind: AttachmentKind,
    /// URL for links, stored file name for files.
    #[validate(length(min = 1, max = 300, message = "target must be 1 to 300 characters"))]
    pub(crate) target: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttachmentResponse {
    pub(crate) id: String,
    pub(crate) lesson_id: String,
    pub(crate) display_name: String,
    pub(crate) kind: AttachmentKind,
    pub(crate) target: String,
    pub(crate) created_at: String,
}

impl AttachmentResponse {
    pub(crate) fn from_db(attachment: LessonAttachment) -> Self {
        Self {
            id: attachment.id,
            lesson_id: attachment.lesson_id,
            display_name: attachment.display_name,
            kind: attachment.kind,
            target: attachment.url_or_filename,
            created_at: format_primitive(attachment.created_at),
        }
    }
}
