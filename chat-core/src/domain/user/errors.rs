use thiserror::Error;

use auth::PasswordError;
use auth::TokenError;

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username must not be empty")]
    Empty,
}

/// Error for credential store operations
#[derive(Debug, Clone, Error)]
pub enum CredentialStoreError {
    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    #[error("Credential store unavailable: {0}")]
    Unavailable(String),
}

/// Top-level error for registration, login, and token validation
#[derive(Debug, Error)]
pub enum AuthError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Password must not be empty")]
    EmptyPassword,

    // Domain-level errors
    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    /// Covers both unknown usernames and wrong passwords so that login
    /// failures never reveal which usernames exist.
    #[error("Invalid credentials")]
    InvalidCredentials,

    // Infrastructure errors
    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Password error: {0}")]
    Hashing(#[from] PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}

impl From<CredentialStoreError> for AuthError {
    fn from(err: CredentialStoreError) -> Self {
        match err {
            CredentialStoreError::DuplicateUsername(username) => AuthError::UsernameTaken(username),
            CredentialStoreError::Unavailable(cause) => AuthError::StoreUnavailable(cause),
        }
    }
}
