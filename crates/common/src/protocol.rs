//! Request and response types exchanged between the browser client and the
//! `daybook` server.
//!
//! All bodies are serialised as JSON. Shapes are deliberately small and ad hoc
//! — there is no versioned wire format.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Auth endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /api/auth`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthRequest {
    /// The shared journal password, in the clear.
    pub password: String,
}

/// Response body for `POST /api/auth` and `POST /api/auth/logout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Whether the caller is now authenticated (or logged out).
    pub success: bool,
    /// Human-readable failure reason; present only on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthResponse {
    /// A successful auth response.
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// A failed auth response carrying a reason.
    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(reason.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// One calendar day's journal text.
///
/// Used both as the `POST /api/entries` request body and as the response body
/// of every entry route. In the `GET /api/entries` list, `content` holds only
/// the first [`PREVIEW_LEN`] characters of the stored text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Calendar day key, `YYYY-MM-DD`.
    pub date: String,
    /// Markdown text blob.
    pub content: String,
}

/// Number of characters of `content` returned per entry in the list view.
pub const PREVIEW_LEN: usize = 100;

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// One checklist item with manual ordering.
///
/// Ids are client-generated opaque strings; `order` is the client-maintained
/// position in the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub text: String,
    pub completed: bool,
    #[serde(default)]
    pub order: i64,
}

/// Request body for `POST /api/tasks` — the full replacement list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksSyncRequest {
    pub tasks: Vec<Task>,
}

/// Response body for `POST /api/tasks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksSyncResponse {
    pub message: String,
    /// Number of tasks now stored.
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Whether the SQLite store answered a probe query.
    pub db_ready: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_success_omits_error_field() {
        let json = serde_json::to_string(&AuthResponse::ok()).unwrap();
        assert_eq!(json, r#"{"success":true}"#);
    }

    #[test]
    fn auth_failure_carries_reason() {
        let resp = AuthResponse::failure("Invalid password");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("Invalid password"));
        assert!(json.contains(r#""success":false"#));
    }

    #[test]
    fn entry_round_trip() {
        let entry = Entry {
            date: "2025-03-14".into(),
            content: "# pi day".into(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        let decoded: Entry = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, entry);
    }

    #[test]
    fn task_order_defaults_to_zero() {
        let task: Task =
            serde_json::from_str(r#"{"id":"task-1","text":"water plants","completed":false}"#)
                .unwrap();
        assert_eq!(task.order, 0);
    }

    #[test]
    fn tasks_sync_rejects_non_array() {
        let result = serde_json::from_str::<TasksSyncRequest>(r#"{"tasks":"not-a-list"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn error_response_new() {
        let e = ErrorResponse::new("bad_request", "invalid date");
        assert_eq!(e.code, "bad_request");
        assert!(e.message.contains("invalid date"));
    }

    #[test]
    fn health_response_serde() {
        let h = HealthResponse {
            status: "ok".into(),
            db_ready: true,
        };
        let json = serde_json::to_string(&h).unwrap();
        let decoded: HealthResponse = serde_json::from_str(&json).unwrap();
        assert!(decoded.db_ready);
    }
}
