//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::Unauthorized`] → 401
/// - [`ServiceError::Storage`] → 500
/// - [`ServiceError::Unavailable`] → 503
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed — invalid date, bad JSON, or a payload that
    /// does not match the expected shape.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The session cookie is missing, invalid, or expired, or the supplied
    /// password was wrong.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The SQLite store failed to execute a query.
    #[error("storage failure: {0}")]
    Storage(String),

    /// The store is temporarily unreachable.
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::Unauthorized(_) => 401,
            ServiceError::Storage(_) => 500,
            ServiceError::Unavailable(_) => 503,
        }
    }

    /// Short machine-readable code used in [`ErrorResponse`] bodies.
    ///
    /// [`ErrorResponse`]: crate::protocol::ErrorResponse
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::Unauthorized(_) => "unauthorized",
            ServiceError::Storage(_) => "internal_error",
            ServiceError::Unavailable(_) => "service_unavailable",
        }
    }
}
