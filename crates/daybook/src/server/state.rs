//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::Config;
use crate::store::Store;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-wrapped or already `Arc`-backed) so
/// that Axum can clone the state for each request without copying anything
/// expensive.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the SQLite document store.
    pub store: Store,
    /// The shared journal password, compared verbatim on login.
    pub password: Arc<String>,
    /// HMAC key for session tokens.
    pub session_secret: Arc<String>,
    /// Session cookie lifetime in seconds.
    pub session_ttl_secs: u64,
    /// Whether session cookies carry the `Secure` attribute.
    pub cookie_secure: bool,
}

impl AppState {
    /// Create a new [`AppState`] from an opened store and the loaded config.
    pub fn new(store: Store, cfg: &Config) -> Self {
        Self {
            store,
            password: Arc::new(cfg.journal_password.clone()),
            session_secret: Arc::new(cfg.session_secret.clone()),
            session_ttl_secs: cfg.session_ttl_secs,
            cookie_secure: cfg.cookie_secure,
        }
    }
}
