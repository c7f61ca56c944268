use serde::Serialize;

use crate::core::time::format_date;
use crate::services::certificates::CertificateData;

#[derive(Debug, Serialize)]
pub(crate) struct CertificateResponse {
    pub(crate) student_name: String,
    pub(crate) student_cpf: String,
    pub(crate) course_title: String,
    pub(crate) course_load: i32,
    pub(crate) completion_date: String,
    pub(crate) verification_code: String,
}

impl CertificateResponse {
    pub(crate) fn from_data(data: CertificateData) -> Self {
        Self {
            student_name: data.student_name,
            student_cpf: data.student_cpf,
            course_title: data.course_title,
            course_load: data.course_load,
            completion_date: format_date(data.completion_date),
            verification_code: data.verification_code,
        }
    }
}
