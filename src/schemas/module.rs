use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::CourseModule;
use crate::schemas::lesson::LessonSummaryResponse;
use crate::services::progression::ModuleView;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ModuleUpsert {
    #[validate(length(min = 5, max = 140, message = "title must be 5 to 140 characters"))]
    pub(crate) title: String,
    /// Omitted on create to append after the last module.
    #[serde(default)]
    pub(crate) order: Option<i32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModuleResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) order: i32,
}

impl ModuleResponse {
    pub(crate) fn from_db(module: CourseModule) -> Self {
        Self {
            id: module.id,
            course_id: module.course_id,
            title: module.title,
            order: module.position,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ModuleProgressResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) order: i32,
    pub(crate) is_locked: bool,
    pub(crate) quiz_id: Option<String>,
    pub(crate) lessons: Vec<LessonSummaryResponse>,
}

impl ModuleProgressResponse {
    pub(crate) fn from_view(view: ModuleView, quiz_id: Option<String>) -> Self {
        Self {
            id: view.module.id,
            title: view.module.title,
            order: view.module.position,
            is_locked: view.is_locked,
            quiz_id,
            lessons: view.lessons.into_iter().map(LessonSummaryResponse::from_view).collect(),
        }
    }
}
