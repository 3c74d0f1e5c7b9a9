//! Axum router construction.

use std::path::Path;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    services::{ServeDir, ServeFile},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::{handlers, middleware, state::AppState};

/// Build the application [`Router`] with all routes and middleware attached.
///
/// Everything under the session gate: the journal page and the entry/task API.
/// Outside it: login, logout, the login page, static assets, and `/health`.
pub fn build(state: AppState, static_dir: &str) -> Router {
    let dir = Path::new(static_dir);

    let protected = Router::new()
        .route(
            "/api/entries",
            get(handlers::list_entries).post(handlers::save_entry),
        )
        .route("/api/entries/:date", get(handlers::get_entry))
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::sync_tasks),
        )
        .route_service("/journal", ServeFile::new(dir.join("journal.html")))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_session));

    Router::new()
        .route("/api/auth", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/health", get(handlers::health))
        .route_service("/", ServeFile::new(dir.join("index.html")))
        .nest_service("/assets", ServeDir::new(dir.join("assets")))
        .merge(protected)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(middleware::REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .with_state(state)
}
