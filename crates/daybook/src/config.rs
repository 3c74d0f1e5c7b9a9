//! Configuration loading and validation for the journal service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated journal service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// The shared password that gates the whole journal. **Required.**
    pub journal_password: String,

    /// HMAC key used to sign session tokens. **Required** — there is
    /// deliberately no built-in fallback secret.
    pub session_secret: String,

    /// Filesystem path of the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Session cookie lifetime in seconds.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// Whether to add the `Secure` attribute to the session cookie. Enable
    /// when the service sits behind TLS.
    #[serde(default)]
    pub cookie_secure: bool,

    /// Directory containing the static frontend (login page, journal page,
    /// assets).
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_database_path() -> String {
    "daybook.db".into()
}
fn default_http_port() -> u16 {
    3000
}
fn default_session_ttl() -> u64 {
    // 4 hours, matching the cookie Max-Age.
    4 * 60 * 60
}
fn default_static_dir() -> String {
    "static".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.journal_password, "JOURNAL_PASSWORD")?;
        ensure_non_empty(&self.session_secret, "SESSION_SECRET")?;
        ensure_non_empty(&self.database_path, "DATABASE_PATH")?;
        ensure_non_empty(&self.static_dir, "STATIC_DIR")?;

        if self.session_ttl_secs == 0 {
            anyhow::bail!("SESSION_TTL_SECS must be > 0");
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
