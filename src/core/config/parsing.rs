use std::{env, str::FromStr};

use super::types::{ConfigError, Environment};

const DEFAULT_CORS_ORIGINS: &[&str] =
    &["http://localhost:5173", "http://localhost:3000", "http://localhost:8080"];

pub(super) const DEFAULT_ATTACHMENT_EXTENSIONS: &[&str] =
    &["pdf", "zip", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "jpg", "png"];

/// Trimmed value of `key`; blank counts as unset.
pub(super) fn env_optional(key: &str) -> Option<String> {
    let value = env::var(key).ok()?;
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub(super) fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

pub(super) fn env_flag(key: &str, default: bool) -> bool {
    env_optional(key).map_or(default, |value| parse_bool(&value))
}

pub(super) fn parse_number<T: FromStr>(field: &'static str, value: String) -> Result<T, ConfigError> {
    match value.parse::<T>() {
        Ok(parsed) => Ok(parsed),
        Err(_) => Err(ConfigError::InvalidValue { field, value }),
    }
}

/// Accepts a JSON array or a comma separated list; empty input falls back to local dev origins.
pub(super) fn parse_cors_origins(value: Option<String>) -> Result<Vec<String>, ConfigError> {
    let origins = match value.as_deref().map(str::trim) {
        None | Some("") => Vec::new(),
        Some(raw) if raw.starts_with('[') => serde_json::from_str::<Vec<String>>(raw)
            .map_err(|_| ConfigError::InvalidCors(raw.to_string()))?,
        Some(raw) => split_list(raw).map(str::to_string).collect(),
    };

    if origins.is_empty() {
        Ok(DEFAULT_CORS_ORIGINS.iter().map(|origin| origin.to_string()).collect())
    } else {
        Ok(origins)
    }
}

/// Lowercased extensions without a leading dot.
pub(super) fn parse_extensions(value: Option<String>) -> Vec<String> {
    match value {
        Some(raw) => split_list(&raw)
            .map(|item| item.trim_start_matches('.').to_ascii_lowercase())
            .filter(|item| !item.is_empty())
            .collect(),
        None => DEFAULT_ATTACHMENT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty())
}

pub(super) fn parse_bool(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

pub(super) fn parse_environment(value: Option<String>) -> Environment {
    let Some(value) = value else {
        return Environment::Development;
    };
    match value.to_ascii_lowercase().as_str() {
        "production" | "prod" => Environment::Production,
        "staging" => Environment::Staging,
        "test" | "testing" => Environment::Test,
        _ => Environment::Development,
    }
}
