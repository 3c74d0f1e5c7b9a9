//! Axum HTTP server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the Axum router: API routes, the static frontend, shared layers.
//! - Gate journal and task routes behind the session cookie.
//! - Inject shared application state (`AppState`) into handlers.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
