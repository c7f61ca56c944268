use std::path::Path;

use time::{macros::format_description, Date};
use validator::ValidateUrl;

use crate::api::errors::ApiError;
use crate::db::types::AttachmentKind;

pub(crate) const MIN_PASSWORD_LEN: usize = 8;
const MIN_ANSWER_LEN: usize = 10;
const MAX_CHOICE_LEN: usize = 200;

const GENDERS: &[&str] = &["male", "female", "other", "undisclosed"];
const EDUCATION_LEVELS: &[&str] = &[
    "high_school_incomplete",
    "high_school_complete",
    "higher_education_incomplete",
    "higher_education_complete",
    "postgraduate",
];

pub(crate) fn validate_password_len(password: &str) -> Result<(), ApiError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )))
    }
}

/// Accepts a CPF with or without punctuation and returns it as `000.000.000-00`.
pub(crate) fn normalize_cpf(cpf: &str) -> Result<String, ApiError> {
    let digits: String = cpf.chars().filter(|ch| !matches!(ch, '.' | '-' | ' ')).collect();
    if digits.len() != 11 || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(ApiError::BadRequest("CPF must contain exactly 11 digits".to_string()));
    }
    Ok(format!("{}.{}.{}-{}", &digits[0..3], &digits[3..6], &digits[6..9], &digits[9..11]))
}

pub(crate) fn parse_birth_date(value: &str) -> Result<Date, ApiError> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| ApiError::BadRequest("birth_date must use the YYYY-MM-DD format".to_string()))
}

/// Two-letter state code, returned uppercase.
pub(crate) fn normalize_state(state: &str) -> Result<String, ApiError> {
    let trimmed = state.trim();
    if trimmed.len() == 2 && trimmed.chars().all(|ch| ch.is_ascii_alphabetic()) {
        Ok(trimmed.to_ascii_uppercase())
    } else {
        Err(ApiError::BadRequest("state must be a two-letter code".to_string()))
    }
}

pub(crate) fn validate_gender(gender: Option<&str>) -> Result<(), ApiError> {
    match gender {
        None => Ok(()),
        Some(value) if GENDERS.contains(&value) => Ok(()),
        Some(value) => Err(ApiError::BadRequest(format!("Unknown gender '{value}'"))),
    }
}

pub(crate) fn validate_education_level(level: &str) -> Result<(), ApiError> {
    if EDUCATION_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!("Unknown education_level '{level}'")))
    }
}

/// Trimmed answer text; the minimum length applies after trimming.
pub(crate) fn normalize_answer_text(text: &str) -> Result<&str, ApiError> {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_ANSWER_LEN {
        return Err(ApiError::BadRequest(format!(
            "answer must be at least {MIN_ANSWER_LEN} characters"
        )));
    }
    Ok(trimmed)
}

/// Links must be absolute http(s) URLs; files must carry an allowed extension.
pub(crate) fn validate_attachment_target(
    kind: AttachmentKind,
    target: &str,
    allowed_extensions: &[String],
) -> Result<(), ApiError> {
    match kind {
        AttachmentKind::Link => {
            let http = target.starts_with("https://") || target.starts_with("http://");
            if http && target.validate_url() {
                Ok(())
            } else {
                Err(ApiError::BadRequest("Link attachments need an http(s) URL".to_string()))
            }
        }
        AttachmentKind::File => {
            let extension = Path::new(target)
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.to_ascii_lowercase())
                .ok_or_else(|| ApiError::BadRequest("File must have an extension".to_string()))?;
            if allowed_extensions.iter().any(|allowed| allowed == &extension) {
                Ok(())
            } else {
                Err(ApiError::BadRequest(format!("File extension '{extension}' is not allowed")))
            }
        }
    }
}

pub(crate) fn validate_choices(choices: &[String]) -> Result<(), ApiError> {
    for (index, choice) in choices.iter().enumerate() {
        let len = choice.trim().chars().count();
        if len == 0 || len > MAX_CHOICE_LEN {
            return Err(ApiError::BadRequest(format!(
                "Choice {} must be 1 to {MAX_CHOICE_LEN} characters",
                index + 1
            )));
        }
    }
    Ok(())
}
