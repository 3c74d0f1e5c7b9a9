//! HMAC-SHA256 signed session tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Prefix that appears at the start of every session token.
pub const VERSION_PREFIX: &str = "v1";

/// Claims embedded in a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Always `true` in tokens this service issues; verified on every request.
    pub authenticated: bool,
    /// Expiry as unix seconds.
    pub exp: i64,
}

/// Errors produced when verifying a session token.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The token does not match the expected `v1.<claims>.<tag>` structure.
    #[error("invalid session token format")]
    InvalidFormat,

    /// The HMAC tag does not verify against the configured secret.
    #[error("session token signature mismatch")]
    InvalidSignature,

    /// The token's `exp` claim is in the past.
    #[error("session token expired")]
    Expired,

    /// The claims decode but do not carry `authenticated: true`.
    #[error("session token does not carry an authenticated claim")]
    NotAuthenticated,
}

/// Issue a fresh token valid for `ttl_secs` from now.
pub fn issue(secret: &[u8], ttl_secs: u64) -> String {
    issue_at(secret, ttl_secs, Utc::now().timestamp())
}

/// Verify `token` against `secret`, checking signature, expiry, and the
/// authenticated claim.
///
/// # Errors
///
/// Returns the first failed check as a [`TokenError`]. Signature verification
/// is constant-time.
pub fn verify(secret: &[u8], token: &str) -> Result<Claims, TokenError> {
    verify_at(secret, token, Utc::now().timestamp())
}

fn issue_at(secret: &[u8], ttl_secs: u64, now: i64) -> String {
    let claims = Claims {
        authenticated: true,
        exp: now + ttl_secs as i64,
    };
    // Claims serialisation cannot fail: two plain fields, no maps.
    let claims_json = serde_json::to_vec(&claims).unwrap_or_default();
    let signed_part = format!("{}.{}", VERSION_PREFIX, URL_SAFE_NO_PAD.encode(claims_json));
    let tag = compute_tag(secret, signed_part.as_bytes());
    format!("{}.{}", signed_part, URL_SAFE_NO_PAD.encode(tag))
}

fn verify_at(secret: &[u8], token: &str, now: i64) -> Result<Claims, TokenError> {
    let parts: Vec<&str> = token.splitn(3, '.').collect();
    if parts.len() != 3 || parts[0] != VERSION_PREFIX {
        return Err(TokenError::InvalidFormat);
    }

    let tag = URL_SAFE_NO_PAD
        .decode(parts[2])
        .map_err(|_| TokenError::InvalidFormat)?;
    let signed_part = format!("{}.{}", parts[0], parts[1]);

    // Mac::verify_slice is constant-time.
    mac(secret)
        .chain_update(signed_part.as_bytes())
        .verify_slice(&tag)
        .map_err(|_| TokenError::InvalidSignature)?;

    let claims_json = URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|_| TokenError::InvalidFormat)?;
    let claims: Claims =
        serde_json::from_slice(&claims_json).map_err(|_| TokenError::InvalidFormat)?;

    if claims.exp <= now {
        return Err(TokenError::Expired);
    }
    if !claims.authenticated {
        return Err(TokenError::NotAuthenticated);
    }
    Ok(claims)
}

fn compute_tag(secret: &[u8], data: &[u8]) -> Vec<u8> {
    mac(secret).chain_update(data).finalize().into_bytes().to_vec()
}

fn mac(secret: &[u8]) -> HmacSha256 {
    // HMAC-SHA256 accepts keys of any length; new_from_slice cannot fail.
    HmacSha256::new_from_slice(secret).unwrap_or_else(|_| unreachable!("hmac accepts any key length"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-signing-secret";

    #[test]
    fn issue_verify_round_trip() {
        let token = issue(SECRET, 3600);
        let claims = verify(SECRET, &token).unwrap();
        assert!(claims.authenticated);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn token_has_versioned_structure() {
        let token = issue(SECRET, 3600);
        assert!(token.starts_with("v1."));
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let token = issue(SECRET, 3600);
        assert_eq!(
            verify(b"other-secret", &token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn tampered_claims_fail_verification() {
        let token = issue(SECRET, 3600);
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let forged = Claims {
            authenticated: true,
            exp: i64::MAX,
        };
        parts[1] = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());
        let tampered = parts.join(".");
        assert_eq!(
            verify(SECRET, &tampered),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn expired_token_rejected() {
        let token = issue_at(SECRET, 10, Utc::now().timestamp() - 3600);
        assert_eq!(verify(SECRET, &token), Err(TokenError::Expired));
    }

    #[test]
    fn rejects_bad_prefix() {
        let token = issue(SECRET, 3600);
        let downgraded = format!("v0{}", token.strip_prefix("v1").unwrap());
        assert_eq!(verify(SECRET, &downgraded), Err(TokenError::InvalidFormat));
    }

    #[test]
    fn rejects_too_few_parts() {
        assert_eq!(verify(SECRET, "v1.abc"), Err(TokenError::InvalidFormat));
    }

    #[test]
    fn rejects_bad_base64_tag() {
        assert_eq!(verify(SECRET, "v1.abc.!!!"), Err(TokenError::InvalidFormat));
    }
}
