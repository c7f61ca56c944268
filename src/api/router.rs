use axum::{
    extract::MatchedPath,
    http::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN},
    http::{HeaderName, Method, Request, Response},
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    normalize_path::NormalizePathLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Span;

use crate::api::{admin, auth, courses, handlers, lessons, quizzes};
use crate::core::{config::Settings, state::AppState};

const REQUEST_ID_HEADER: &str = "x-request-id";

fn api_v1() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/courses", courses::router())
        .nest("/lessons", lessons::router())
        .nest("/quizzes", quizzes::router())
        .nest("/admin", admin::router())
}

pub(crate) fn router(state: AppState) -> Router {
    let cors = build_cors_layer(state.settings());
    let prefix = state.settings().api().api_v1_str.clone();
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    // Spans carry the route template when routing has matched one.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<axum::body::Body>| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            let route = request
                .extensions()
                .get::<MatchedPath>()
                .map_or_else(|| request.uri().path(), MatchedPath::as_str)
                .to_string();
            tracing::info_span!(
                "request",
                method = %request.method(),
                route = %route,
                request_id = %request_id
            )
        })
        .on_response(|response: &Response<axum::body::Body>, latency: Duration, _span: &Span| {
            let status = response.status().as_u16().to_string();
            metrics::counter!("http_requests_total", "status" => status.clone()).increment(1);
            metrics::histogram!("http_request_duration_seconds", "status" => status)
                .record(latency.as_secs_f64());
        });

    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz).head(handlers::healthz))
        .route("/metrics", get(handlers::metrics))
        .nest(&prefix, api_v1())
        .layer(NormalizePathLayer::trim_trailing_slash())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}

fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT, ORIGIN, request_id.clone()])
        .expose_headers([request_id])
        .max_age(Duration::from_secs(3600));

    let origins: Vec<HeaderValue> = settings
        .cors()
        .origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if origins.is_empty() {
        // credentials cannot be combined with a wildcard origin
        layer.allow_origin(Any)
    } else {
        layer.allow_credentials(true).allow_origin(AllowOrigin::list(origins))
    }
}

#[cfg(test)]
mod tests {
    use super::router;
    use axum::{body::Body, http::Method, http::Request, http::StatusCode};
    use tower::ServiceExt;

    use crate::core::state::AppState;
    use crate::core::{config::Settings, metrics};
    use crate::test_support;

    fn build_state(settings: Settings) -> AppState {
        let db =
            sqlx::PgPool::connect_lazy(&settings.database().database_url()).expect("lazy pool");
        AppState::new(settings, db)
    }

    async fn load_settings() -> (tokio::sync::OwnedMutexGuard<()>, Settings) {
        let guard = test_support::env_lock().await;
        test_support::clear_config_env();
        std::env::set_var("SECRET_KEY", "test-secret");
        (guard, Settings::load().expect("settings"))
    }

    #[tokio::test]
    async fn root_returns_project_name() {
        let (_guard, settings) = load_settings().await;
        let app = router(build_state(settings));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = test_support::read_json(response).await;
        assert_eq!(json["message"], "Learnpath API");
        assert_eq!(json["api_prefix"], "/api/v1");
    }

    #[tokio::test]
    async fn metrics_disabled_returns_404() {
        let (_guard, settings) = load_settings().await;
        let app = router(build_state(settings));

        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn metrics_enabled_returns_200() {
        let guard = test_support::env_lock().await;
        test_support::clear_config_env();
        std::env::set_var("SECRET_KEY", "test-secret");
        std::env::set_var("PROMETHEUS_ENABLED", "1");
        let settings = Settings::load().expect("settings");
        std::env::remove_var("PROMETHEUS_ENABLED");

        metrics::init(&settings).expect("metrics init");
        let app = router(build_state(settings));

        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        drop(guard);
    }

    #[tokio::test]
    async fn learner_routes_require_bearer_token() {
        let (_guard, settings) = load_settings().await;
        let app = router(build_state(settings));

        for (method, uri) in [
            (Method::GET, "/api/v1/courses"),
            (Method::POST, "/api/v1/lessons/some-lesson/complete"),
            (Method::POST, "/api/v1/quizzes/some-quiz/submit"),
            (Method::GET, "/api/v1/admin/users"),
        ] {
            let response = app
                .clone()
                .oneshot(test_support::json_request(method, uri, None, None))
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn forged_token_is_rejected() {
        let (_guard, settings) = load_settings().await;
        let app = router(build_state(settings));

        let response = app
            .oneshot(test_support::json_request(
                Method::GET,
                "/api/v1/auth/me",
                Some("not-a-jwt"),
                None,
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
