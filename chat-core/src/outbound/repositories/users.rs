use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::errors::CredentialStoreError;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::domain::user::ports::CredentialStore;

/// Credential store backed by process memory.
///
/// Reference adapter for tests and single-process deployments; a database
/// backed implementation slots in behind the same port. Keying the map by
/// username makes the duplicate check and the insert one atomic step under
/// the write lock, which is what keeps concurrent registrations of the same
/// name down to a single winner.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, CredentialStoreError> {
        Ok(self.users.read().await.get(username.as_str()).cloned())
    }

    async fn create(&self, user: User) -> Result<User, CredentialStoreError> {
        let mut users = self.users.write().await;

        if users.contains_key(user.username.as_str()) {
            return Err(CredentialStoreError::DuplicateUsername(
                user.username.as_str().to_string(),
            ));
        }

        users.insert(user.username.as_str().to_string(), user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn user(name: &str, hash: &str) -> User {
        User {
            username: Username::new(name.to_string()).unwrap(),
            password_hash: hash.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_find() {
        let store = InMemoryCredentialStore::new();

        store.create(user("alice", "digest-a")).await.unwrap();

        let found = store
            .find_by_username(&Username::new("alice".to_string()).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.password_hash, "digest-a");
    }

    #[tokio::test]
    async fn test_find_unknown_user() {
        let store = InMemoryCredentialStore::new();

        let found = store
            .find_by_username(&Username::new("nobody".to_string()).unwrap())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_keeps_original() {
        let store = InMemoryCredentialStore::new();

        store.create(user("alice", "digest-a")).await.unwrap();
        let result = store.create(user("alice", "digest-b")).await;

        match result {
            Err(CredentialStoreError::DuplicateUsername(name)) => assert_eq!(name, "alice"),
            other => panic!("Expected DuplicateUsername, got {:?}", other),
        }

        // The original credential is untouched.
        let found = store
            .find_by_username(&Username::new("alice".to_string()).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.password_hash, "digest-a");
    }

    #[tokio::test]
    async fn test_usernames_are_case_sensitive() {
        let store = InMemoryCredentialStore::new();

        store.create(user("alice", "digest-a")).await.unwrap();
        store.create(user("Alice", "digest-b")).await.unwrap();

        let found = store
            .find_by_username(&Username::new("Alice".to_string()).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.password_hash, "digest-b");
    }

    #[tokio::test]
    async fn test_concurrent_creates_have_one_winner() {
        let store = Arc::new(InMemoryCredentialStore::new());

        let mut tasks = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.create(user("alice", &format!("digest-{}", i))).await
            }));
        }

        let mut winners = 0;
        let mut duplicates = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => winners += 1,
                Err(CredentialStoreError::DuplicateUsername(_)) => duplicates += 1,
                Err(other) => panic!("Unexpected error: {:?}", other),
            }
        }

        assert_eq!(winners, 1);
        assert_eq!(duplicates, 7);
    }
}
