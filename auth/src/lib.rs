//! Authentication building blocks for the chat core
//!
//! Provides the two stateless primitives the domain services compose:
//! - Password hashing (Argon2id with per-hash random salts)
//! - Session token issuance and validation (JWT, HS256)
//!
//! The crate knows nothing about users or stores. Services inject these
//! types and keep their own policies (uniqueness, lockout, and so on) on top.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let digest = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &digest).unwrap());
//! assert!(!hasher.verify("not_my_password", &digest).unwrap());
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::TokenIssuer;
//! use chrono::Duration;
//!
//! let issuer = TokenIssuer::new(
//!     b"secret_key_at_least_32_bytes_long!",
//!     Duration::hours(24),
//!     TokenIssuer::DEFAULT_LEEWAY_SECS,
//! );
//! let token = issuer.issue("alice").unwrap();
//! assert_eq!(issuer.validate(&token).unwrap(), "alice");
//! ```

pub mod password;
pub mod token;

// Re-export commonly used items
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::SessionClaims;
pub use token::TokenError;
pub use token::TokenIssuer;
