use axum::Router;

use crate::core::state::AppState;

mod content;
mod courses;
mod quizzes;
mod users;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .merge(courses::router())
        .merge(content::router())
        .merge(quizzes::router())
        .merge(users::router())
}
