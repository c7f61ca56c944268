use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::{Choice, Question, Quiz};
use crate::repositories::quizzes::CHOICES_PER_QUESTION;
use crate::services::learning::QuizResult;
use crate::services::progression::PASSING_SCORE;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionUpsert {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub(crate) text: String,
    pub(crate) choices: [String; CHOICES_PER_QUESTION],
    /// 1-based index into `choices`.
    #[validate(range(min = 1, max = 3, message = "correct_choice must be 1, 2 or 3"))]
    pub(crate) correct_choice: i16,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuizSubmit {
    /// question id -> chosen choice id
    #[serde(default)]
    pub(crate) answers: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChoiceResponse {
    pub(crate) id: String,
    pub(crate) text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) is_correct: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) text: String,
    pub(crate) choices: Vec<ChoiceResponse>,
}

impl QuestionResponse {
    /// `reveal` controls whether correctness flags are included.
    pub(crate) fn from_db(question: Question, choices: &[Choice], reveal: bool) -> Self {
        let choices = choices
            .iter()
            .filter(|choice| choice.question_id == question.id)
            .map(|choice| ChoiceResponse {
                id: choice.id.clone(),
                text: choice.text.clone(),
                is_correct: reveal.then_some(choice.is_correct),
            })
            .collect();
        Self { id: question.id, text: question.text, choices }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizResponse {
    pub(crate) id: String,
    pub(crate) module_id: String,
    pub(crate) title: String,
    pub(crate) questions: Vec<QuestionResponse>,
}

impl QuizResponse {
    pub(crate) fn from_parts(
        quiz: Quiz,
        questions: Vec<Question>,
        choices: &[Choice],
        reveal: bool,
    ) -> Self {
        Self {
            id: quiz.id,
            module_id: quiz.module_id,
            title: quiz.title,
            questions: questions
                .into_iter()
                .map(|question| QuestionResponse::from_db(question, choices, reveal))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizResultResponse {
    pub(crate) attempt_id: String,
    pub(crate) quiz_id: String,
    pub(crate) score: f64,
    pub(crate) passed: bool,
    pub(crate) best_score: f64,
    pub(crate) passing_score: f64,
}

impl QuizResultResponse {
    pub(crate) fn from_result(result: QuizResult) -> Self {
        Self {
            attempt_id: result.attempt.id,
            quiz_id: result.attempt.quiz_id,
            score: result.attempt.score,
            passed: result.passed,
            best_score: result.best_score,
            passing_score: PASSING_SCORE,
        }
    }
}
