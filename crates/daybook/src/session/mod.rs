//! Stateless session credentials.
//!
//! A session is an opaque signed token proving the shared password was
//! supplied, delivered to the browser in an httpOnly cookie. Nothing is stored
//! server-side; expiry lives inside the token itself.
//!
//! # Token format
//!
//! ```text
//! v1.<base64url-no-pad(claims JSON)>.<base64url-no-pad(HMAC-SHA256 tag)>
//! ```
//!
//! The tag covers the `v1.<claims>` prefix, so neither the version nor the
//! claims can be swapped without invalidating the signature. The `v1` prefix
//! enables future claim or algorithm migration without breaking live sessions.

pub mod cookie;
pub mod token;
