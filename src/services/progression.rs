//! Course progression: which modules and lessons a student may open, and
//! whether the course is finished well enough to earn a certificate.
//!
//! The lock rules are pure functions over ordered course content plus the
//! student's completion set. Storage is reached only through [`ProgressSource`]
//! so the rules run the same against Postgres and against in-memory fixtures.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;

use crate::db::models::{CourseModule, Lesson, Quiz, QuizAttempt};

/// Minimum best score (percent) a module quiz needs for certificate eligibility.
pub(crate) const PASSING_SCORE: f64 = 75.0;

#[async_trait]
pub(crate) trait ProgressSource: Send + Sync {
    /// Modules of the course sorted by `(position, created_at, id)`.
    async fn modules_ordered(&self, course_id: &str) -> Result<Vec<CourseModule>, sqlx::Error>;
    /// Lessons of the module sorted by `(position, created_at, id)`.
    async fn lessons_ordered(&self, module_id: &str) -> Result<Vec<Lesson>, sqlx::Error>;
    async fn completed_lesson_ids(&self, user_id: &str) -> Result<HashSet<String>, sqlx::Error>;
    async fn best_attempt(
        &self,
        user_id: &str,
        quiz_id: &str,
    ) -> Result<Option<QuizAttempt>, sqlx::Error>;
    async fn count_lessons(&self, course_id: &str) -> Result<i64, sqlx::Error>;
    async fn count_completions(&self, user_id: &str, course_id: &str) -> Result<i64, sqlx::Error>;
    /// Quizzes of the course's modules, in module order.
    async fn course_quizzes(&self, course_id: &str) -> Result<Vec<Quiz>, sqlx::Error>;
}

#[derive(Debug, Clone)]
pub(crate) struct LessonView {
    pub(crate) lesson: Lesson,
    pub(crate) is_locked: bool,
    pub(crate) is_complete: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct ModuleView {
    pub(crate) module: CourseModule,
    pub(crate) is_locked: bool,
    pub(crate) lessons: Vec<LessonView>,
}

impl ModuleView {
    fn all_complete(&self) -> bool {
        self.lessons.iter().all(|lesson| lesson.is_complete)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Eligibility {
    pub(crate) eligible: bool,
    pub(crate) total_lessons: i64,
    pub(crate) completed_lessons: i64,
    /// Best score per attempted quiz id. Unattempted quizzes have no entry.
    pub(crate) best_scores: BTreeMap<String, f64>,
}

/// Derives lock state for ordered content.
///
/// The first module is always open. Any later module opens only once every
/// lesson of the module before it is complete, so an empty module never
/// blocks the next one. Inside an open module the first lesson is open and
/// each following lesson needs its predecessor complete. Every lesson of a
/// locked module is locked.
pub(crate) fn lock_structure(
    content: Vec<(CourseModule, Vec<Lesson>)>,
    completed: &HashSet<String>,
) -> Vec<ModuleView> {
    let mut views: Vec<ModuleView> = Vec::with_capacity(content.len());

    for (module, lessons) in content {
        let is_locked = views.last().is_some_and(|previous| !previous.all_complete());

        let mut lesson_views: Vec<LessonView> = Vec::with_capacity(lessons.len());
        for lesson in lessons {
            let is_complete = completed.contains(&lesson.id);
            let lesson_locked = is_locked
                || lesson_views.last().is_some_and(|previous| !previous.is_complete);
            lesson_views.push(LessonView { lesson, is_locked: lesson_locked, is_complete });
        }

        views.push(ModuleView { module, is_locked, lessons: lesson_views });
    }

    views
}

/// A course with no lessons is never eligible. Every quiz in `quiz_ids` must
/// have a best score of at least [`PASSING_SCORE`]; an unattempted quiz fails.
pub(crate) fn evaluate_eligibility(
    total_lessons: i64,
    completed_lessons: i64,
    quiz_ids: &[String],
    best_scores: BTreeMap<String, f64>,
) -> Eligibility {
    let lessons_done = total_lessons > 0 && completed_lessons >= total_lessons;
    let quizzes_passed = quiz_ids
        .iter()
        .all(|id| best_scores.get(id).is_some_and(|score| *score >= PASSING_SCORE));

    Eligibility {
        eligible: lessons_done && quizzes_passed,
        total_lessons,
        completed_lessons,
        best_scores,
    }
}

pub(crate) async fn compute_structure<S>(
    source: &S,
    course_id: &str,
    user_id: &str,
) -> Result<Vec<ModuleView>, sqlx::Error>
where
    S: ProgressSource + ?Sized,
{
    let modules = source.modules_ordered(course_id).await?;
    let mut content = Vec::with_capacity(modules.len());
    for module in modules {
        let lessons = source.lessons_ordered(&module.id).await?;
        content.push((module, lessons));
    }
    let completed = source.completed_lesson_ids(user_id).await?;
    Ok(lock_structure(content, &completed))
}

pub(crate) async fn compute_eligibility<S>(
    source: &S,
    course_id: &str,
    user_id: &str,
) -> Result<Eligibility, sqlx::Error>
where
    S: ProgressSource + ?Sized,
{
    let total_lessons = source.count_lessons(course_id).await?;
    let completed_lessons = source.count_completions(user_id, course_id).await?;

    let quizzes = source.course_quizzes(course_id).await?;
    let mut quiz_ids = Vec::with_capacity(quizzes.len());
    let mut best_scores = BTreeMap::new();
    for quiz in quizzes {
        if let Some(best) = source.best_attempt(user_id, &quiz.id).await? {
            best_scores.insert(quiz.id.clone(), best.score);
        }
        quiz_ids.push(quiz.id);
    }

    Ok(evaluate_eligibility(total_lessons, completed_lessons, &quiz_ids, best_scores))
}

/// Locates a lesson in a computed structure.
pub(crate) fn find_lesson<'a>(structure: &'a [ModuleView], lesson_id: &str) -> Option<&'a LessonView> {
    structure
        .iter()
        .flat_map(|module| module.lessons.iter())
        .find(|view| view.lesson.id == lesson_id)
}

pub(crate) fn find_module<'a>(structure: &'a [ModuleView], module_id: &str) -> Option<&'a ModuleView> {
    structure.iter().find(|view| view.module.id == module_id)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use time::macros::datetime;

    use super::*;

    /// Ordered course content held in memory.
    #[derive(Default)]
    pub(crate) struct MemorySource {
        modules: Vec<CourseModule>,
        lessons: Vec<Lesson>,
        quizzes: Vec<Quiz>,
        completions: HashMap<String, HashSet<String>>,
        attempts: Vec<QuizAttempt>,
    }

    impl MemorySource {
        pub(crate) fn add_module(&mut self, course_id: &str, id: &str, position: i32) {
            self.modules.push(CourseModule {
                id: id.to_string(),
                course_id: course_id.to_string(),
                title: format!("Module {id}"),
                position,
                created_at: datetime!(2025-01-01 0:00),
                updated_at: datetime!(2025-01-01 0:00),
            });
        }

        pub(crate) fn add_lesson(&mut self, module_id: &str, id: &str, position: i32) {
            self.lessons.push(Lesson {
                id: id.to_string(),
                module_id: module_id.to_string(),
                title: format!("Lesson {id}"),
                content: "content".to_string(),
                has_response_field: false,
                position,
                created_at: datetime!(2025-01-01 0:00),
                updated_at: datetime!(2025-01-01 0:00),
            });
        }

        pub(crate) fn add_quiz(&mut self, module_id: &str, id: &str) {
            self.quizzes.push(Quiz {
                id: id.to_string(),
                module_id: module_id.to_string(),
                title: format!("Assessment: {module_id}"),
                created_at: datetime!(2025-01-01 0:00),
            });
        }

        pub(crate) fn complete(&mut self, user_id: &str, lesson_id: &str) {
            self.completions
                .entry(user_id.to_string())
                .or_default()
                .insert(lesson_id.to_string());
        }

        pub(crate) fn attempt(&mut self, user_id: &str, quiz_id: &str, score: f64) {
            let id = format!("attempt-{}", self.attempts.len());
            self.attempts.push(QuizAttempt {
                id,
                user_id: user_id.to_string(),
                quiz_id: quiz_id.to_string(),
                score,
                attempted_at: datetime!(2025-01-02 0:00),
            });
        }

        fn module_course(&self, module_id: &str) -> Option<&str> {
            self.modules
                .iter()
                .find(|module| module.id == module_id)
                .map(|module| module.course_id.as_str())
        }

        fn course_lessons<'a>(&'a self, course_id: &'a str) -> impl Iterator<Item = &'a Lesson> + 'a {
            self.lessons
                .iter()
                .filter(move |lesson| self.module_course(&lesson.module_id) == Some(course_id))
        }
    }

    #[async_trait]
    impl ProgressSource for MemorySource {
        async fn modules_ordered(&self, course_id: &str) -> Result<Vec<CourseModule>, sqlx::Error> {
            let mut modules: Vec<CourseModule> = self
                .modules
                .iter()
                .filter(|module| module.course_id == course_id)
                .cloned()
                .collect();
            modules.sort_by(|a, b| {
                (a.position, a.created_at, &a.id).cmp(&(b.position, b.created_at, &b.id))
            });
            Ok(modules)
        }

        async fn lessons_ordered(&self, module_id: &str) -> Result<Vec<Lesson>, sqlx::Error> {
            let mut lessons: Vec<Lesson> = self
                .lessons
                .iter()
                .filter(|lesson| lesson.module_id == module_id)
                .cloned()
                .collect();
            lessons.sort_by(|a, b| {
                (a.position, a.created_at, &a.id).cmp(&(b.position, b.created_at, &b.id))
            });
            Ok(lessons)
        }

        async fn completed_lesson_ids(&self, user_id: &str) -> Result<HashSet<String>, sqlx::Error> {
            Ok(self.completions.get(user_id).cloned().unwrap_or_default())
        }

        async fn best_attempt(
            &self,
            user_id: &str,
            quiz_id: &str,
        ) -> Result<Option<QuizAttempt>, sqlx::Error> {
            Ok(self
                .attempts
                .iter()
                .filter(|attempt| attempt.user_id == user_id && attempt.quiz_id == quiz_id)
                .max_by(|a, b| a.score.total_cmp(&b.score))
                .cloned())
        }

        async fn count_lessons(&self, course_id: &str) -> Result<i64, sqlx::Error> {
            Ok(self.course_lessons(course_id).count() as i64)
        }

        async fn count_completions(&self, user_id: &str, course_id: &str) -> Result<i64, sqlx::Error> {
            let Some(done) = self.completions.get(user_id) else {
                return Ok(0);
            };
            Ok(self.course_lessons(course_id).filter(|lesson| done.contains(&lesson.id)).count()
                as i64)
        }

        async fn course_quizzes(&self, course_id: &str) -> Result<Vec<Quiz>, sqlx::Error> {
            let modules = self.modules_ordered(course_id).await?;
            Ok(modules
                .iter()
                .filter_map(|module| {
                    self.quizzes.iter().find(|quiz| quiz.module_id == module.id).cloned()
                })
                .collect())
        }
    }

    fn lock_flags(structure: &[ModuleView]) -> Vec<(bool, Vec<bool>)> {
        structure
            .iter()
            .map(|module| {
                (module.is_locked, module.lessons.iter().map(|lesson| lesson.is_locked).collect())
            })
            .collect()
    }

    /// M1 with lessons L1, L2; M2 with lesson L3.
    fn two_module_course() -> MemorySource {
        let mut source = MemorySource::default();
        source.add_module("course", "m1", 1);
        source.add_module("course", "m2", 2);
        source.add_lesson("m1", "l1", 1);
        source.add_lesson("m1", "l2", 2);
        source.add_lesson("m2", "l3", 1);
        source
    }

    #[tokio::test]
    async fn unlocks_monotonically_as_lessons_complete() {
        let mut source = two_module_course();

        let structure = compute_structure(&source, "course", "student").await.unwrap();
        assert_eq!(lock_flags(&structure), vec![(false, vec![false, true]), (true, vec![true])]);

        source.complete("student", "l1");
        let structure = compute_structure(&source, "course", "student").await.unwrap();
        assert_eq!(lock_flags(&structure), vec![(false, vec![false, false]), (true, vec![true])]);

        source.complete("student", "l2");
        let structure = compute_structure(&source, "course", "student").await.unwrap();
        assert_eq!(lock_flags(&structure), vec![(false, vec![false, false]), (false, vec![false])]);
    }

    #[tokio::test]
    async fn module_lock_ignores_lesson_locks_of_previous_module() {
        let mut source = two_module_course();
        // Out-of-order completion: L2 complete while L1 is not.
        source.complete("student", "l2");

        let structure = compute_structure(&source, "course", "student").await.unwrap();
        assert!(structure[0].lessons[1].is_complete);
        assert!(structure[0].lessons[1].is_locked);
        assert!(structure[1].is_locked);

        source.complete("student", "l1");
        let structure = compute_structure(&source, "course", "student").await.unwrap();
        assert!(!structure[1].is_locked);
    }

    #[tokio::test]
    async fn empty_module_never_blocks_the_next_one() {
        let mut source = MemorySource::default();
        source.add_module("course", "m1", 1);
        source.add_module("course", "m2", 2);
        source.add_lesson("m2", "l1", 1);

        let structure = compute_structure(&source, "course", "student").await.unwrap();
        assert!(!structure[0].is_locked);
        assert!(!structure[1].is_locked);
        assert!(!structure[1].lessons[0].is_locked);
    }

    #[tokio::test]
    async fn first_lesson_of_first_module_is_always_open() {
        let source = two_module_course();
        let structure = compute_structure(&source, "course", "nobody").await.unwrap();
        let first = find_lesson(&structure, "l1").unwrap();
        assert!(!first.is_locked);
        assert!(!first.is_complete);
    }

    #[tokio::test]
    async fn ordering_uses_position_then_id() {
        let mut source = MemorySource::default();
        source.add_module("course", "b", 1);
        source.add_module("course", "a", 1);
        source.add_module("course", "z", 0);

        let structure = compute_structure(&source, "course", "student").await.unwrap();
        let ids: Vec<&str> = structure.iter().map(|view| view.module.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "b"]);
    }

    #[tokio::test]
    async fn completions_in_other_courses_do_not_count() {
        let mut source = two_module_course();
        source.add_module("other", "x1", 1);
        source.add_lesson("x1", "x-lesson", 1);
        source.complete("student", "x-lesson");

        let eligibility = compute_eligibility(&source, "course", "student").await.unwrap();
        assert_eq!(eligibility.total_lessons, 3);
        assert_eq!(eligibility.completed_lessons, 0);
    }

    fn completed_course_with_quizzes(scores: &[(&str, f64)]) -> MemorySource {
        let mut source = two_module_course();
        source.add_quiz("m1", "q1");
        source.add_quiz("m2", "q2");
        for lesson in ["l1", "l2", "l3"] {
            source.complete("student", lesson);
        }
        for (quiz, score) in scores {
            source.attempt("student", quiz, *score);
        }
        source
    }

    #[tokio::test]
    async fn eligibility_boundary_is_inclusive_at_passing_score() {
        let source = completed_course_with_quizzes(&[("q1", 75.0), ("q2", 100.0)]);
        let eligibility = compute_eligibility(&source, "course", "student").await.unwrap();
        assert!(eligibility.eligible);

        let source = completed_course_with_quizzes(&[("q1", 70.0), ("q1", 75.0), ("q2", 80.0)]);
        let eligibility = compute_eligibility(&source, "course", "student").await.unwrap();
        assert!(eligibility.eligible);
        assert_eq!(eligibility.best_scores.get("q1"), Some(&75.0));

        let source = completed_course_with_quizzes(&[("q1", 74.999), ("q2", 100.0)]);
        let eligibility = compute_eligibility(&source, "course", "student").await.unwrap();
        assert!(!eligibility.eligible);
    }

    #[tokio::test]
    async fn best_score_is_the_maximum_attempt() {
        let source = completed_course_with_quizzes(&[("q1", 40.0), ("q1", 90.0), ("q1", 60.0)]);
        let eligibility = compute_eligibility(&source, "course", "student").await.unwrap();
        assert_eq!(eligibility.best_scores.get("q1"), Some(&90.0));
        assert!(!eligibility.eligible);
    }

    #[tokio::test]
    async fn unattempted_quizzes_have_no_score_entry() {
        let mut source = MemorySource::default();
        source.add_module("course", "m1", 1);
        source.add_lesson("m1", "l1", 1);
        source.add_quiz("m1", "q1");
        source.complete("student", "l1");

        let eligibility = compute_eligibility(&source, "course", "student").await.unwrap();
        assert!(eligibility.best_scores.is_empty());
        assert!(!eligibility.eligible);

        source.attempt("student", "q1", 80.0);
        let eligibility = compute_eligibility(&source, "course", "student").await.unwrap();
        assert_eq!(eligibility.best_scores.len(), 1);
        assert!(eligibility.eligible);
    }

    #[tokio::test]
    async fn incomplete_lessons_block_eligibility() {
        let mut source = two_module_course();
        source.complete("student", "l1");
        source.complete("student", "l2");
        let eligibility = compute_eligibility(&source, "course", "student").await.unwrap();
        assert!(!eligibility.eligible);
        assert_eq!(eligibility.completed_lessons, 2);
    }

    #[tokio::test]
    async fn course_without_lessons_is_never_eligible() {
        let mut source = MemorySource::default();
        source.add_module("course", "m1", 1);
        let eligibility = compute_eligibility(&source, "course", "student").await.unwrap();
        assert!(!eligibility.eligible);
        assert_eq!(eligibility.total_lessons, 0);
    }

    #[test]
    fn course_without_quizzes_needs_only_lessons() {
        let eligibility = evaluate_eligibility(2, 2, &[], BTreeMap::new());
        assert!(eligibility.eligible);

        let quiz = vec!["q1".to_string()];
        assert!(!evaluate_eligibility(2, 2, &quiz, BTreeMap::new()).eligible);
    }
}
