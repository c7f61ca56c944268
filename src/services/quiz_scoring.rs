use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ScoringError {
    #[error("This quiz has no questions yet")]
    EmptyQuiz,
}

/// One quiz question and the id of its correct choice.
#[derive(Debug, Clone)]
pub(crate) struct AnswerKey {
    pub(crate) question_id: String,
    pub(crate) correct_choice_id: Option<String>,
}

impl From<(String, Option<String>)> for AnswerKey {
    fn from((question_id, correct_choice_id): (String, Option<String>)) -> Self {
        Self { question_id, correct_choice_id }
    }
}

/// Percentage of questions answered with their correct choice.
///
/// `submitted` maps question id to the chosen choice id. Unanswered
/// questions and answers to unknown questions never count.
pub(crate) fn score_attempt(
    key: &[AnswerKey],
    submitted: &HashMap<String, String>,
) -> Result<f64, ScoringError> {
    if key.is_empty() {
        return Err(ScoringError::EmptyQuiz);
    }

    let correct = key
        .iter()
        .filter(|entry| {
            match (submitted.get(&entry.question_id), entry.correct_choice_id.as_ref()) {
                (Some(chosen), Some(expected)) => chosen == expected,
                _ => false,
            }
        })
        .count();

    Ok(correct as f64 / key.len() as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(pairs: &[(&str, &str)]) -> Vec<AnswerKey> {
        pairs
            .iter()
            .map(|(question, choice)| AnswerKey {
                question_id: question.to_string(),
                correct_choice_id: Some(choice.to_string()),
            })
            .collect()
    }

    fn answers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(q, c)| (q.to_string(), c.to_string())).collect()
    }

    #[test]
    fn three_of_four_correct_scores_seventy_five() {
        let key = key(&[("q1", "a"), ("q2", "b"), ("q3", "c"), ("q4", "d")]);
        let submitted = answers(&[("q1", "a"), ("q2", "b"), ("q3", "c"), ("q4", "x")]);
        assert_eq!(score_attempt(&key, &submitted), Ok(75.0));
    }

    #[test]
    fn unanswered_questions_count_as_wrong() {
        let key = key(&[("q1", "a"), ("q2", "b")]);
        let submitted = answers(&[("q1", "a")]);
        assert_eq!(score_attempt(&key, &submitted), Ok(50.0));
        assert_eq!(score_attempt(&key, &HashMap::new()), Ok(0.0));
    }

    #[test]
    fn answers_to_unknown_questions_are_ignored() {
        let key = key(&[("q1", "a")]);
        let submitted = answers(&[("q1", "a"), ("elsewhere", "a")]);
        assert_eq!(score_attempt(&key, &submitted), Ok(100.0));
    }

    #[test]
    fn question_without_correct_choice_never_counts() {
        let key = vec![AnswerKey { question_id: "q1".to_string(), correct_choice_id: None }];
        let submitted = answers(&[("q1", "a")]);
        assert_eq!(score_attempt(&key, &submitted), Ok(0.0));
    }

    #[test]
    fn empty_quiz_is_rejected() {
        assert_eq!(score_attempt(&[], &HashMap::new()), Err(ScoringError::EmptyQuiz));
    }
}
