use std::sync::Arc;
use std::time::Duration;

use auth::TokenIssuer;
use chat_core::broadcast::BroadcastHub;
use chat_core::domain::message::service::ChatService;
use chat_core::domain::message::service::DEFAULT_RECENT_LIMIT;
use chat_core::domain::user::service::AuthService;
use chat_core::outbound::repositories::messages::InMemoryMessageStore;
use chat_core::outbound::repositories::users::InMemoryCredentialStore;
use chat_core::ChatEvent;
use chat_core::SubscriberHandle;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-token-signing-at-least-32-bytes";

/// Test application wiring the services to in-memory adapters
pub struct TestChat {
    pub auth: Arc<AuthService<InMemoryCredentialStore>>,
    pub chat: Arc<ChatService<InMemoryMessageStore>>,
    pub hub: Arc<BroadcastHub>,
    pub tokens: Arc<TokenIssuer>,
}

impl TestChat {
    /// Build a test application with the default queue capacity
    pub fn build() -> Self {
        Self::with_queue_capacity(BroadcastHub::DEFAULT_QUEUE_CAPACITY)
    }

    /// Build a test application with a custom per-subscriber queue capacity
    pub fn with_queue_capacity(queue_capacity: usize) -> Self {
        let tokens = Arc::new(TokenIssuer::new(
            TEST_SECRET,
            chrono::Duration::hours(24),
            TokenIssuer::DEFAULT_LEEWAY_SECS,
        ));

        let auth = Arc::new(AuthService::new(
            Arc::new(InMemoryCredentialStore::new()),
            tokens.clone(),
        ));

        let hub = Arc::new(BroadcastHub::new(queue_capacity));
        let chat = Arc::new(ChatService::new(
            Arc::new(InMemoryMessageStore::new()),
            hub.clone(),
            DEFAULT_RECENT_LIMIT,
        ));

        Self {
            auth,
            chat,
            hub,
            tokens,
        }
    }
}

/// Receive the next event for a subscriber, failing the test after a timeout
pub async fn recv_event(handle: &mut SubscriberHandle) -> ChatEvent {
    tokio::time::timeout(Duration::from_secs(1), handle.recv())
        .await
        .expect("Timed out waiting for an event")
        .expect("Subscription closed before an event arrived")
}
