use async_trait::async_trait;

use crate::domain::user::errors::CredentialStoreError;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;

/// Repository port for user credential persistence.
///
/// The store is the source of truth for username uniqueness: `create` must
/// check for an existing username and insert as one atomic step, so that
/// concurrent registrations of the same name resolve to exactly one winner.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Look up a user by exact username.
    ///
    /// # Arguments
    /// * `username` - Username to search for
    ///
    /// # Returns
    /// User if found, None if not registered
    ///
    /// # Errors
    /// * `Unavailable` - The backing store failed
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, CredentialStoreError>;

    /// Persist a new user credential record.
    ///
    /// # Arguments
    /// * `user` - User to create
    ///
    /// # Returns
    /// The created user
    ///
    /// # Errors
    /// * `DuplicateUsername` - The username is already registered
    /// * `Unavailable` - The backing store failed
    async fn create(&self, user: User) -> Result<User, CredentialStoreError>;
}
