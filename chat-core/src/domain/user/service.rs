use std::sync::Arc;

use auth::PasswordError;
use auth::PasswordHasher;
use auth::TokenIssuer;

use super::errors::AuthError;
use super::models::Session;
use super::models::User;
use super::models::Username;
use super::ports::CredentialStore;

/// Registration and login on top of an injected credential store.
///
/// Composes the password hasher and token issuer from the `auth` crate with
/// a credential store. Hashing and verification run on the blocking pool:
/// the KDF is slow on purpose and must not stall runtime workers that are
/// also dispatching chat events.
pub struct AuthService<CS>
where
    CS: CredentialStore,
{
    credential_store: Arc<CS>,
    password_hasher: PasswordHasher,
    token_issuer: Arc<TokenIssuer>,
}

impl<CS> AuthService<CS>
where
    CS: CredentialStore,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `credential_store` - Credential persistence implementation
    /// * `token_issuer` - Issuer for session tokens
    pub fn new(credential_store: Arc<CS>, token_issuer: Arc<TokenIssuer>) -> Self {
        Self {
            credential_store,
            password_hasher: PasswordHasher::new(),
            token_issuer,
        }
    }

    /// Register a new user and issue their first session token.
    ///
    /// The store's `create` is the sole authority on uniqueness; there is no
    /// lookup beforehand, so two racing registrations of the same name are
    /// settled by whichever insert lands first.
    ///
    /// # Arguments
    /// * `username` - Requested username, must be non-empty
    /// * `password` - Plaintext password, must be non-empty
    ///
    /// # Returns
    /// Session with the registered username and a fresh token
    ///
    /// # Errors
    /// * `InvalidUsername` - Username is empty
    /// * `EmptyPassword` - Password is empty
    /// * `UsernameTaken` - The username is already registered
    /// * `StoreUnavailable` - The backing store failed
    /// * `Hashing` - Password hashing failed
    pub async fn register(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let username = Username::new(username.to_string())?;
        if password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }

        let password_hash = self.hash_password(password.to_string()).await?;

        let user = self
            .credential_store
            .create(User {
                username,
                password_hash,
            })
            .await?;

        tracing::info!("User registered: {}", user.username);

        self.issue_session(user.username)
    }

    /// Verify credentials and issue a fresh session token.
    ///
    /// Unknown usernames and wrong passwords both come back as
    /// `InvalidCredentials`; nothing in the error reveals which it was.
    ///
    /// # Arguments
    /// * `username` - Username to authenticate
    /// * `password` - Plaintext password to verify
    ///
    /// # Returns
    /// Session with the authenticated username and a fresh token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password
    /// * `StoreUnavailable` - The backing store failed
    /// * `Hashing` - Password verification failed
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let username =
            Username::new(username.to_string()).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .credential_store
            .find_by_username(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let verified = self
            .verify_password(password.to_string(), user.password_hash.clone())
            .await?;
        if !verified {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::debug!("Login verified: {}", user.username);

        self.issue_session(user.username)
    }

    /// Validate a session token and return the username it belongs to.
    ///
    /// # Arguments
    /// * `token` - Token string presented by a client
    ///
    /// # Errors
    /// * `Token` - The token is expired, malformed, or badly signed
    pub fn validate_token(&self, token: &str) -> Result<String, AuthError> {
        Ok(self.token_issuer.validate(token)?)
    }

    fn issue_session(&self, username: Username) -> Result<Session, AuthError> {
        let token = self.token_issuer.issue(username.as_str())?;
        Ok(Session { username, token })
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.password_hasher;
        let digest = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PasswordError::HashingFailed(format!("Hashing task failed: {}", e)))??;
        Ok(digest)
    }

    async fn verify_password(&self, password: String, digest: String) -> Result<bool, AuthError> {
        let hasher = self.password_hasher;
        let verified = tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| {
                PasswordError::VerificationFailed(format!("Verification task failed: {}", e))
            })??;
        Ok(verified)
    }
}
