use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::SessionClaims;
use super::errors::TokenError;

/// Issues and validates signed session tokens.
///
/// Tokens are compact JWTs signed with HS256 and a server-held secret. The
/// issuer is stateless: validation recomputes the signature and checks the
/// expiry claim against the current clock, nothing else is consulted, so a
/// token stays valid until it expires even across process restarts.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
    leeway_secs: u64,
}

impl TokenIssuer {
    /// Clock skew tolerated when checking the expiry claim.
    pub const DEFAULT_LEEWAY_SECS: u64 = 30;

    /// Create a new issuer.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens, at least 32 bytes for HS256
    /// * `ttl` - How long issued tokens stay valid
    /// * `leeway_secs` - Seconds past expiry a token is still accepted
    pub fn new(secret: &[u8], ttl: Duration, leeway_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            ttl,
            leeway_secs,
        }
    }

    /// Issue a token for `username`, valid for the configured TTL.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token serialization or signing failed
    pub fn issue(&self, username: &str) -> Result<String, TokenError> {
        self.issue_at(username, Utc::now())
    }

    fn issue_at(&self, username: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = SessionClaims::new(username, now, self.ttl);
        let header = Header::new(self.algorithm);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Validate a token and return the username it was issued to.
    ///
    /// # Errors
    /// * `Expired` - The expiry claim is further in the past than the leeway
    /// * `Invalid` - Bad signature, malformed token, or missing claims
    pub fn validate(&self, token: &str) -> Result<String, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = self.leeway_secs;

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })?;

        Ok(token_data.claims.sub)
    }
}
