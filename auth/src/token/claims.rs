use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Claims carried by a session token.
///
/// Deliberately minimal: the subject username plus issue and expiry instants
/// as RFC 7519 Unix timestamps. There is no server-side session state; the
/// signature is the only thing that makes these claims trustworthy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the authenticated username
    pub sub: String,

    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,

    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
}

impl SessionClaims {
    /// Build claims for a username, valid from `issued_at` for `ttl`.
    pub fn new(username: &str, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: username.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }
}
