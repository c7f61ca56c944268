pub(crate) mod answers;
pub(crate) mod attachments;
pub(crate) mod attempts;
pub(crate) mod authorizations;
pub(crate) mod completions;
pub(crate) mod courses;
pub(crate) mod enrollments;
pub(crate) mod lessons;
pub(crate) mod modules;
mod progress;
pub(crate) mod quizzes;
pub(crate) mod users;
