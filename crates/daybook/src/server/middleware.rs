//! Axum middleware layers applied to the router.
//!
//! Includes request tracing, timeout enforcement, response compression, and
//! the session gate protecting journal and task routes.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use common::protocol::ErrorResponse;
use tracing::debug;

use crate::session::{cookie, token};
use super::state::AppState;

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Session gate applied to every protected route.
///
/// A request passes when its `auth_token` cookie carries a token that
/// verifies against the configured secret and has not expired. Otherwise:
///
/// - `/api/*` routes answer `401` with a JSON body;
/// - page routes redirect to the login page, clearing whatever stale cookie
///   the browser presented.
pub async fn require_session(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    match cookie::token_from_headers(req.headers()) {
        Some(tok) => match token::verify(state.session_secret.as_bytes(), &tok) {
            Ok(_) => return next.run(req).await,
            Err(e) => debug!(error = %e, "rejected session token"),
        },
        None => debug!("request without session cookie"),
    }

    if req.uri().path().starts_with("/api/") {
        let err = ErrorResponse::new("unauthorized", "a valid session cookie is required");
        return (StatusCode::UNAUTHORIZED, Json(err)).into_response();
    }

    let mut resp = Redirect::to("/").into_response();
    if let Ok(value) = HeaderValue::from_str(&cookie::clear_cookie(state.cookie_secure)) {
        resp.headers_mut().insert(header::SET_COOKIE, value);
    }
    resp
}
