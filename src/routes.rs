// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::get,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{questions, stats, submissions},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges the submission, question and stats sub-routers.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (database pool, dataset).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let submission_routes = Router::new().route(
        "/",
        get(submissions::list_submissions).post(submissions::create_submission),
    );

    let question_routes = Router::new()
        .route("/", get(questions::list_questions))
        .route("/{id}/snippet", get(questions::get_snippet));

    let stats_routes = Router::new()
        .route("/", get(stats::get_stats))
        .route("/questions", get(stats::list_question_stats))
        .route("/questions/{name}", get(stats::get_question_stats));

    Router::new()
        .nest("/api/submissions", submission_routes)
        .nest("/api/questions", question_routes)
        .nest("/api/stats", stats_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
