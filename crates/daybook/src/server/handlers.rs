//! Axum request handlers for all service endpoints.

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use common::protocol::{
    AuthRequest, AuthResponse, Entry, ErrorResponse, HealthResponse, TasksSyncRequest,
    TasksSyncResponse,
};
use common::ServiceError;
use tracing::{info, warn};

use crate::session::{cookie, token};
use super::state::AppState;

/// `POST /api/auth` — exchange the shared password for a session cookie.
///
/// On a match the response sets the httpOnly `auth_token` cookie; on a
/// mismatch the response is `401` with `{success: false}` and no cookie.
pub async fn login(State(state): State<AppState>, Json(req): Json<AuthRequest>) -> Response {
    if req.password != *state.password {
        info!("login attempt with wrong password");
        let body = AuthResponse::failure("Invalid password");
        return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    }

    let tok = token::issue(state.session_secret.as_bytes(), state.session_ttl_secs);
    let set_cookie = cookie::session_cookie(&tok, state.session_ttl_secs, state.cookie_secure);

    let mut resp = (StatusCode::OK, Json(AuthResponse::ok())).into_response();
    match HeaderValue::from_str(&set_cookie) {
        Ok(value) => {
            resp.headers_mut().insert(header::SET_COOKIE, value);
            resp
        }
        Err(e) => {
            warn!(error = %e, "failed to encode session cookie");
            let err = ErrorResponse::new("internal_error", "failed to issue session cookie");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(err)).into_response()
        }
    }
}

/// `POST /api/auth/logout` — clear the session cookie.
pub async fn logout(State(state): State<AppState>) -> Response {
    let mut resp = (StatusCode::OK, Json(AuthResponse::ok())).into_response();
    if let Ok(value) = HeaderValue::from_str(&cookie::clear_cookie(state.cookie_secure)) {
        resp.headers_mut().insert(header::SET_COOKIE, value);
    }
    resp
}

/// `GET /api/entries` — all entries, newest first, content truncated to a
/// preview.
pub async fn list_entries(State(state): State<AppState>) -> Response {
    match state.store.list_entries().await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => {
            warn!(error = %e, "failed to list entries");
            service_error(&ServiceError::Storage("failed to list entries".into()))
        }
    }
}

/// `POST /api/entries` — upsert one day's entry.
///
/// The entry is created on first save for its date and overwritten on every
/// later save. Last write wins; there is no conflict detection.
pub async fn save_entry(State(state): State<AppState>, Json(entry): Json<Entry>) -> Response {
    if let Err(e) = parse_date(&entry.date) {
        return service_error(&e);
    }
    match state.store.upsert_entry(&entry.date, &entry.content).await {
        Ok(()) => (StatusCode::OK, Json(entry)).into_response(),
        Err(e) => {
            warn!(error = %e, date = %entry.date, "failed to save entry");
            service_error(&ServiceError::Storage("failed to save entry".into()))
        }
    }
}

/// `GET /api/entries/{date}` — one day's entry.
///
/// A date that was never saved answers with an empty entry rather than 404, so
/// the editor can open any day directly.
pub async fn get_entry(State(state): State<AppState>, Path(date): Path<String>) -> Response {
    if let Err(e) = parse_date(&date) {
        return service_error(&e);
    }
    match state.store.entry(&date).await {
        Ok(Some(entry)) => (StatusCode::OK, Json(entry)).into_response(),
        Ok(None) => {
            let empty = Entry {
                date,
                content: String::new(),
            };
            (StatusCode::OK, Json(empty)).into_response()
        }
        Err(e) => {
            warn!(error = %e, date = %date, "failed to fetch entry");
            service_error(&ServiceError::Storage("failed to fetch entry".into()))
        }
    }
}

/// `GET /api/tasks` — the full task list ordered by the client-maintained
/// `order` field.
pub async fn list_tasks(State(state): State<AppState>) -> Response {
    match state.store.tasks().await {
        Ok(tasks) => (StatusCode::OK, Json(tasks)).into_response(),
        Err(e) => {
            warn!(error = %e, "failed to list tasks");
            service_error(&ServiceError::Storage("failed to fetch tasks".into()))
        }
    }
}

/// `POST /api/tasks` — replace the entire task list.
pub async fn sync_tasks(
    State(state): State<AppState>,
    Json(req): Json<TasksSyncRequest>,
) -> Response {
    let count = req.tasks.len();
    match state.store.replace_tasks(&req.tasks).await {
        Ok(()) => {
            let body = TasksSyncResponse {
                message: "Tasks updated successfully".into(),
                count,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "failed to sync tasks");
            service_error(&ServiceError::Storage("failed to update tasks".into()))
        }
    }
}

/// `GET /health` — liveness and readiness check.
///
/// Returns `200 OK` when the store answers a probe query, `503` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let db_ready = state.store.ping().await;
    let (status_code, status_str) = if db_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };
    let body = HealthResponse {
        status: status_str.into(),
        db_ready,
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validate a calendar-day string. Dates are the primary key of the entries
/// table; rejecting malformed ones here keeps the key space clean.
fn parse_date(date: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| ServiceError::BadRequest(format!("invalid date: {date}")))
}

/// Convert a [`ServiceError`] into its JSON error response.
fn service_error(err: &ServiceError) -> Response {
    let status = StatusCode::from_u16(err.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::new(err.code(), err.to_string()))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::Request,
        routing::{get, post},
        Router,
    };
    use common::protocol::Task;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::store::Store;

    fn test_state() -> AppState {
        let cfg = Config {
            journal_password: "hunter2".into(),
            session_secret: "test-secret".into(),
            database_path: ":memory:".into(),
            http_port: 0,
            session_ttl_secs: 3600,
            cookie_secure: false,
            static_dir: "static".into(),
            log_level: "info".into(),
        };
        AppState::new(Store::open_in_memory().unwrap(), &cfg)
    }

    fn test_router() -> Router {
        Router::new()
            .route("/api/auth", post(login))
            .route("/api/auth/logout", post(logout))
            .route("/api/entries", get(list_entries).post(save_entry))
            .route("/api/entries/:date", get(get_entry))
            .route("/api/tasks", get(list_tasks).post(sync_tasks))
            .route("/health", get(health))
            .with_state(test_state())
    }

    fn json_post(uri: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn json_get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(resp: Response) -> T {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn wrong_password_yields_401_and_no_cookie() {
        let app = test_router();
        let req = json_post("/api/auth", r#"{"password":"wrong"}"#.into());
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp.headers().get(header::SET_COOKIE).is_none());

        let body: AuthResponse = body_json(resp).await;
        assert!(!body.success);
    }

    #[tokio::test]
    async fn correct_password_sets_verifiable_cookie() {
        let app = test_router();
        let req = json_post("/api/auth", r#"{"password":"hunter2"}"#.into());
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let set_cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_owned();
        assert!(set_cookie.contains("HttpOnly"));

        let tok = set_cookie
            .strip_prefix("auth_token=")
            .unwrap()
            .split(';')
            .next()
            .unwrap();
        assert!(token::verify(b"test-secret", tok).is_ok());
    }

    #[tokio::test]
    async fn logout_clears_the_cookie() {
        let app = test_router();
        let req = json_post("/api/auth/logout", String::new());
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let set_cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn entry_round_trips_on_get() {
        let app = test_router();
        let save = json_post(
            "/api/entries",
            r##"{"date":"2025-03-14","content":"# pi day\n\nate pie"}"##.into(),
        );
        let resp = app.clone().oneshot(save).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app.oneshot(json_get("/api/entries/2025-03-14")).await.unwrap();
        let entry: Entry = body_json(resp).await;
        assert_eq!(entry.content, "# pi day\n\nate pie");
    }

    #[tokio::test]
    async fn absent_date_reads_back_empty() {
        let app = test_router();
        let resp = app.oneshot(json_get("/api/entries/2030-01-01")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let entry: Entry = body_json(resp).await;
        assert_eq!(entry.date, "2030-01-01");
        assert_eq!(entry.content, "");
    }

    #[tokio::test]
    async fn malformed_date_is_rejected() {
        let app = test_router();
        let save = json_post(
            "/api/entries",
            r#"{"date":"14-03-2025","content":"x"}"#.into(),
        );
        let resp = app.clone().oneshot(save).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = app.oneshot(json_get("/api/entries/not-a-date")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_returns_truncated_previews_newest_first() {
        let app = test_router();
        let long = "y".repeat(300);
        for (date, content) in [("2025-01-01", long.as_str()), ("2025-02-01", "short")] {
            let save = json_post(
                "/api/entries",
                serde_json::to_string(&Entry {
                    date: date.into(),
                    content: content.into(),
                })
                .unwrap(),
            );
            let resp = app.clone().oneshot(save).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let resp = app.oneshot(json_get("/api/entries")).await.unwrap();
        let entries: Vec<Entry> = body_json(resp).await;
        assert_eq!(entries[0].date, "2025-02-01");
        assert_eq!(entries[1].content.chars().count(), 100);
    }

    #[tokio::test]
    async fn task_sync_replaces_wholesale() {
        let app = test_router();
        let first = json_post(
            "/api/tasks",
            r#"{"tasks":[
                {"id":"t1","text":"water plants","completed":false,"order":0},
                {"id":"t2","text":"write entry","completed":true,"order":1}
            ]}"#
            .into(),
        );
        let resp = app.clone().oneshot(first).await.unwrap();
        let body: TasksSyncResponse = body_json(resp).await;
        assert_eq!(body.count, 2);

        let second = json_post(
            "/api/tasks",
            r#"{"tasks":[{"id":"t3","text":"only survivor","completed":false,"order":0}]}"#.into(),
        );
        let resp = app.clone().oneshot(second).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app.oneshot(json_get("/api/tasks")).await.unwrap();
        let tasks: Vec<Task> = body_json(resp).await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "t3");
    }

    #[tokio::test]
    async fn non_array_tasks_payload_is_rejected() {
        let app = test_router();
        let req = json_post("/api/tasks", r#"{"tasks":"nope"}"#.into());
        let resp = app.oneshot(req).await.unwrap();
        assert!(resp.status().is_client_error());
    }

    #[tokio::test]
    async fn health_reports_ok_with_live_store() {
        let app = test_router();
        let resp = app.oneshot(json_get("/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: HealthResponse = body_json(resp).await;
        assert!(body.db_ready);
        assert_eq!(body.status, "ok");
    }
}
