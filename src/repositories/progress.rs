use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::models::{CourseModule, Lesson, Quiz, QuizAttempt};
use crate::repositories;
use crate::services::progression::ProgressSource;

#[async_trait]
impl ProgressSource for PgPool {
    async fn modules_ordered(&self, course_id: &str) -> Result<Vec<CourseModule>, sqlx::Error> {
        repositories::modules::list_ordered(self, course_id).await
    }

    async fn lessons_ordered(&self, module_id: &str) -> Result<Vec<Lesson>, sqlx::Error> {
        repositories::lessons::list_ordered(self, module_id).await
    }

    async fn completed_lesson_ids(&self, user_id: &str) -> Result<HashSet<String>, sqlx::Error> {
        repositories::completions::completed_lesson_ids(self, user_id).await
    }

    async fn best_attempt(
        &self,
        user_id: &str,
        quiz_id: &str,
    ) -> Result<Option<QuizAttempt>, sqlx::Error> {
        repositories::attempts::best_for_quiz(self, user_id, quiz_id).await
    }

    async fn count_lessons(&self, course_id: &str) -> Result<i64, sqlx::Error> {
        repositories::lessons::count_for_course(self, course_id).await
    }

    async fn count_completions(&self, user_id: &str, course_id: &str) -> Result<i64, sqlx::Error> {
        repositories::completions::count_for_course(self, user_id, course_id).await
    }

    async fn course_quizzes(&self, course_id: &str) -> Result<Vec<Quiz>, sqlx::Error> {
        repositories::quizzes::list_for_course(self, course_id).await
    }
}
