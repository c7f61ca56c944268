use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::{format_date, format_primitive};
use crate::db::models::User;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct UserRegister {
    #[validate(length(min = 1, max = 128, message = "full_name must not be empty"))]
    pub(crate) full_name: String,
    #[validate(
        email(message = "email must be a valid address"),
        length(max = 120, message = "email must be at most 120 characters")
    )]
    pub(crate) email: String,
    pub(crate) cpf: String,
    /// `YYYY-MM-DD`
    pub(crate) birth_date: String,
    #[serde(default)]
    #[validate(length(max = 20, message = "phone is too long"))]
    pub(crate) phone: Option<String>,
    #[validate(length(min = 1, max = 100, message = "city must not be empty"))]
    pub(crate) city: String,
    pub(crate) state: String,
    #[serde(default)]
    pub(crate) gender: Option<String>,
    pub(crate) education_level: String,
    pub(crate) password: String,
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    pub(crate) password_confirm: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: String,
    pub(crate) full_name: String,
    pub(crate) email: String,
    pub(crate) cpf: String,
    pub(crate) birth_date: String,
    pub(crate) phone: Option<String>,
    pub(crate) city: Option<String>,
    pub(crate) state: Option<String>,
    pub(crate) gender: Option<String>,
    pub(crate) education_level: Option<String>,
    pub(crate) is_admin: bool,
    pub(crate) created_at: String,
}

impl UserResponse {
    pub(crate) fn from_db(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            cpf: user.cpf,
            birth_date: format_date(user.birth_date),
            phone: user.phone,
            city: user.city,
            state: user.state,
            gender: user.gender,
            education_level: user.education_level,
            is_admin: user.is_admin,
            created_at: format_primitive(user.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn registration(email: &str) -> UserRegister {
        serde_json::from_value(json!({
            "full_name": "Ana Souza",
            "email": email,
            "cpf": "111.222.333-44",
            "birth_date": "1995-06-15",
            "city": "Florianopolis",
            "state": "SC",
            "education_level": "postgraduate",
            "password": "student-pass",
            "password_confirm": "student-pass"
        }))
        .unwrap()
    }

    #[test]
    fn email_must_fit_the_users_table() {
        assert!(registration("ana@example.org").validate().is_ok());

        let long = format!("ana@{}.{}.org", "a".repeat(60), "b".repeat(60));
        assert!(long.len() > 120);
        assert!(registration(&long).validate().is_err());
    }
}
