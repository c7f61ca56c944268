use sha2::{Digest, Sha256};
use time::Date;

use crate::core::time::format_date;

const VERIFICATION_CODE_LEN: usize = 16;

/// Data handed to the certificate renderer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CertificateData {
    pub(crate) student_name: String,
    pub(crate) student_cpf: String,
    pub(crate) course_title: String,
    pub(crate) course_load: i32,
    pub(crate) completion_date: Date,
    pub(crate) verification_code: String,
}

pub(crate) struct CertificateInput<'a> {
    pub(crate) user_id: &'a str,
    pub(crate) student_name: &'a str,
    pub(crate) student_cpf: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) course_title: &'a str,
    pub(crate) course_load: i32,
    pub(crate) completion_date: Date,
}

pub(crate) fn build_certificate(input: CertificateInput<'_>) -> CertificateData {
    CertificateData {
        student_name: input.student_name.to_string(),
        student_cpf: input.student_cpf.to_string(),
        course_title: input.course_title.to_string(),
        course_load: input.course_load,
        completion_date: input.completion_date,
        verification_code: verification_code(
            input.user_id,
            input.course_id,
            input.completion_date,
        ),
    }
}

pub(crate) fn verification_code(user_id: &str, course_id: &str, date: Date) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{user_id}:{course_id}:{}", format_date(date)).as_bytes());
    let mut code = hex::encode(hasher.finalize());
    code.truncate(VERIFICATION_CODE_LEN);
    code.to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn verification_code_is_stable_uppercase_hex() {
        let first = verification_code("user-1", "course-1", date!(2025 - 03 - 14));
        let second = verification_code("user-1", "course-1", date!(2025 - 03 - 14));
        assert_eq!(first, second);
        assert_eq!(first.len(), 16);
        assert!(first.chars().all(|ch| ch.is_ascii_digit() || ch.is_ascii_uppercase()));
    }

    #[test]
    fn verification_code_depends_on_every_part() {
        let base = verification_code("user-1", "course-1", date!(2025 - 03 - 14));
        assert_ne!(base, verification_code("user-2", "course-1", date!(2025 - 03 - 14)));
        assert_ne!(base, verification_code("user-1", "course-2", date!(2025 - 03 - 14)));
        assert_ne!(base, verification_code("user-1", "course-1", date!(2025 - 03 - 15)));
    }

    #[test]
    fn build_certificate_copies_record_fields() {
        let data = build_certificate(CertificateInput {
            user_id: "user-1",
            student_name: "Ana Souza",
            student_cpf: "123.456.789-09",
            course_id: "course-1",
            course_title: "Introduction to Rust",
            course_load: 40,
            completion_date: date!(2025 - 03 - 14),
        });
        assert_eq!(data.student_name, "Ana Souza");
        assert_eq!(data.course_load, 40);
        assert_eq!(
            data.verification_code,
            verification_code("user-1", "course-1", date!(2025 - 03 - 14))
        );
    }
}
