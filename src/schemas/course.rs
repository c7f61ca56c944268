use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Course, CourseAuthorization, Enrollment};
use crate::repositories::authorizations::AuthorizationView;
use crate::schemas::module::ModuleProgressResponse;
use crate::services::learning::CourseProgress;
use crate::services::progression::{Eligibility, PASSING_SCORE};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CourseUpsert {
    #[validate(length(min = 5, max = 140, message = "title must be 5 to 140 characters"))]
    pub(crate) title: String,
    #[validate(length(min = 10, message = "description must be at least 10 characters"))]
    pub(crate) description: String,
    #[validate(range(min = 1, message = "course_load must be at least 1 hour"))]
    pub(crate) course_load: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) course_load: i32,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl CourseResponse {
    pub(crate) fn from_db(course: Course) -> Self {
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            course_load: course.course_load,
            created_at: format_primitive(course.created_at),
            updated_at: format_primitive(course.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct EligibilityResponse {
    pub(crate) eligible: bool,
    pub(crate) total_lessons: i64,
    pub(crate) completed_lessons: i64,
    pub(crate) passing_score: f64,
}

impl EligibilityResponse {
    fn from_eligibility(eligibility: &Eligibility) -> Self {
        Self {
            eligible: eligibility.eligible,
            total_lessons: eligibility.total_lessons,
            completed_lessons: eligibility.completed_lessons,
            passing_score: PASSING_SCORE,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseDetailResponse {
    pub(crate) course: CourseResponse,
    pub(crate) is_authorized: bool,
    pub(crate) is_enrolled: bool,
    pub(crate) enrolled_at: Option<String>,
    pub(crate) modules: Vec<ModuleProgressResponse>,
    /// Best score per quiz id, only for quizzes with at least one attempt.
    pub(crate) quiz_scores: BTreeMap<String, f64>,
    pub(crate) certificate: Option<EligibilityResponse>,
}

impl CourseDetailResponse {
    pub(crate) fn from_progress(progress: CourseProgress) -> Self {
        let certificate = progress.eligibility.as_ref().map(EligibilityResponse::from_eligibility);
        let quiz_scores =
            progress.eligibility.map(|eligibility| eligibility.best_scores).unwrap_or_default();
        Self {
            course: CourseResponse::from_db(progress.course),
            is_authorized: progress.authorized,
            is_enrolled: progress.enrollment.is_some(),
            enrolled_at: progress
                .enrollment
                .map(|enrollment| format_primitive(enrollment.enrolled_at)),
            modules: progress
                .structure
                .into_iter()
                .map(|view| {
                    let quiz_id = progress
                        .quizzes
                        .iter()
                        .find(|quiz| quiz.module_id == view.module.id)
                        .map(|quiz| quiz.id.clone());
                    ModuleProgressResponse::from_view(view, quiz_id)
                })
                .collect(),
            quiz_scores,
            certificate,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct EnrollmentResponse {
    pub(crate) message: String,
    pub(crate) course_id: String,
    pub(crate) enrolled_at: String,
}

impl EnrollmentResponse {
    pub(crate) fn from_db(enrollment: Enrollment, message: &str) -> Self {
        Self {
            message: message.to_string(),
            course_id: enrollment.course_id,
            enrolled_at: format_primitive(enrollment.enrolled_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AuthorizeRequest {
    #[validate(
        email(message = "email must be a valid address"),
        length(max = 120, message = "email must be at most 120 characters")
    )]
    pub(crate) email: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AuthorizationResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) course_id: String,
    pub(crate) granted_by: Option<String>,
    pub(crate) granted_at: String,
    pub(crate) message: String,
}

impl AuthorizationResponse {
    pub(crate) fn from_db(authorization: CourseAuthorization, message: &str) -> Self {
        Self {
            id: authorization.id,
            user_id: authorization.user_id,
            course_id: authorization.course_id,
            granted_by: authorization.granted_by,
            granted_at: format_primitive(authorization.granted_at),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AuthorizedStudentResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) full_name: String,
    pub(crate) email: String,
    pub(crate) granted_at: String,
}

impl AuthorizedStudentResponse {
    pub(crate) fn from_view(view: AuthorizationView) -> Self {
        Self {
            id: view.id,
            user_id: view.user_id,
            full_name: view.user_full_name,
            email: view.user_email,
            granted_at: format_primitive(view.granted_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_email_is_length_checked() {
        let ok = AuthorizeRequest { email: "student@example.org".to_string() };
        assert!(ok.validate().is_ok());

        let email = format!("student@{}.{}.org", "a".repeat(60), "b".repeat(60));
        let long = AuthorizeRequest { email };
        assert!(long.validate().is_err());
    }
}
