//! Building and parsing the `auth_token` session cookie.
//!
//! The cookie is httpOnly and SameSite=Strict; `Secure` is added when the
//! service is configured as sitting behind TLS.

use axum::http::{header, HeaderMap};

/// Name of the session cookie.
pub const COOKIE_NAME: &str = "auth_token";

/// Build the `Set-Cookie` value that establishes a session.
pub fn session_cookie(token: &str, max_age_secs: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age_secs}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the `Set-Cookie` value that removes the session cookie.
pub fn clear_cookie(secure: bool) -> String {
    let mut cookie = format!("{COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Extract the session token from the request's `Cookie` header(s), if any.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for pair in raw.split(';') {
            if let Some((name, token)) = pair.trim().split_once('=') {
                if name == COOKIE_NAME && !token.is_empty() {
                    return Some(token.to_owned());
                }
            }
        }
    }
    None
}
