use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;

use super::errors::ChatError;
use super::events::ChatEvent;
use super::models::MessageContent;
use super::models::MessageId;
use super::models::MessageWithReactions;
use super::models::NewMessage;
use super::models::ReactionUpdate;
use super::models::ServiceStats;
use super::models::StoredMessage;
use super::ports::MessageStore;
use crate::broadcast::BroadcastHub;
use crate::broadcast::ConnectionId;
use crate::broadcast::SubscriberHandle;
use crate::domain::user::models::Username;

/// Default number of messages a history read returns.
pub const DEFAULT_RECENT_LIMIT: usize = 50;

/// Chat operations on top of an injected message store and the broadcast
/// hub.
///
/// Every mutation follows persist-then-publish: the store accepts the write
/// before any subscriber hears about it, so a client that reloads history
/// right after a notification always finds the message there.
pub struct ChatService<MS>
where
    MS: MessageStore,
{
    message_store: Arc<MS>,
    hub: Arc<BroadcastHub>,
    typing: RwLock<HashSet<String>>,
    recent_limit: usize,
    started_at: Instant,
}

impl<MS> ChatService<MS>
where
    MS: MessageStore,
{
    /// Create a new chat service with injected dependencies.
    ///
    /// # Arguments
    /// * `message_store` - Message persistence implementation
    /// * `hub` - Broadcast hub shared with the embedding server
    /// * `recent_limit` - How many messages `recent_messages` returns at most
    pub fn new(message_store: Arc<MS>, hub: Arc<BroadcastHub>, recent_limit: usize) -> Self {
        Self {
            message_store,
            hub,
            typing: RwLock::new(HashSet::new()),
            recent_limit,
            started_at: Instant::now(),
        }
    }

    /// Persist a message, then fan it out to everyone subscribed.
    ///
    /// # Arguments
    /// * `sender` - Username of the author, must be non-empty
    /// * `content` - Message text, must be non-empty
    ///
    /// # Returns
    /// The stored message with its assigned id and timestamp
    ///
    /// # Errors
    /// * `InvalidUsername` - Sender is empty
    /// * `InvalidContent` - Content is empty
    /// * `StoreUnavailable` - The backing store failed; nothing is broadcast
    pub async fn send(&self, sender: &str, content: &str) -> Result<StoredMessage, ChatError> {
        let draft = NewMessage {
            sender: Username::new(sender.to_string())?,
            content: MessageContent::new(content.to_string())?,
        };

        let stored = self.message_store.append(draft).await?;

        self.hub.publish(ChatEvent::Message(stored.clone())).await;

        tracing::debug!("Message sent: {} (from: {})", stored.id, stored.sender);

        Ok(stored)
    }

    /// The configured window of history, newest first, each message joined
    /// with its current reaction state.
    ///
    /// # Errors
    /// * `StoreUnavailable` - The backing store failed
    pub async fn recent_messages(&self) -> Result<Vec<MessageWithReactions>, ChatError> {
        Ok(self.message_store.recent(self.recent_limit).await?)
    }

    /// Join the conversation: subscribe to the hub and announce the new
    /// roster to everyone, the joiner included.
    ///
    /// # Arguments
    /// * `connection_id` - Identifier for this connection
    /// * `username` - Authenticated username joining
    ///
    /// # Returns
    /// The receiving end of the subscription
    ///
    /// # Errors
    /// * `InvalidUsername` - Username is empty
    pub async fn join(
        &self,
        connection_id: ConnectionId,
        username: &str,
    ) -> Result<SubscriberHandle, ChatError> {
        let username = Username::new(username.to_string())?;

        let handle = self.hub.subscribe(connection_id, username).await;

        let users = self.hub.online_users().await;
        self.hub.publish(ChatEvent::Presence { users }).await;

        Ok(handle)
    }

    /// Leave the conversation. Idempotent.
    ///
    /// Unsubscribes the connection, announces the shrunk roster, and clears
    /// any typing state the departed user left behind.
    pub async fn leave(&self, connection_id: ConnectionId) {
        let username = match self.hub.unsubscribe(connection_id).await {
            Some(username) => username,
            None => return,
        };

        let users = self.hub.online_users().await;
        self.hub.publish(ChatEvent::Presence { users }).await;

        let was_typing = self.typing.write().await.remove(username.as_str());
        if was_typing {
            self.publish_typing().await;
        }
    }

    /// Mark a user as typing or not. Broadcasts only when the set changes.
    ///
    /// # Errors
    /// * `InvalidUsername` - Username is empty
    pub async fn set_typing(&self, username: &str, active: bool) -> Result<(), ChatError> {
        let username = Username::new(username.to_string())?;

        let changed = {
            let mut typing = self.typing.write().await;
            if active {
                typing.insert(username.into_string())
            } else {
                typing.remove(username.as_str())
            }
        };

        if changed {
            self.publish_typing().await;
        }
        Ok(())
    }

    /// Toggle a reaction on a message, then broadcast the post-toggle state.
    ///
    /// # Arguments
    /// * `message_id` - Message being reacted to
    /// * `emoji` - Reaction emoji, must be non-empty
    /// * `username` - User toggling the reaction, must be non-empty
    ///
    /// # Returns
    /// Post-toggle state of that emoji on that message
    ///
    /// # Errors
    /// * `InvalidUsername` - Username is empty
    /// * `EmptyEmoji` - Emoji is empty
    /// * `MessageNotFound` - No message with this id
    /// * `StoreUnavailable` - The backing store failed
    pub async fn react(
        &self,
        message_id: MessageId,
        emoji: &str,
        username: &str,
    ) -> Result<ReactionUpdate, ChatError> {
        let username = Username::new(username.to_string())?;
        if emoji.is_empty() {
            return Err(ChatError::EmptyEmoji);
        }

        let update = self
            .message_store
            .toggle_reaction(message_id, emoji, &username)
            .await?;

        self.hub.publish(ChatEvent::Reaction(update.clone())).await;

        Ok(update)
    }

    /// Point-in-time counters for health reporting.
    ///
    /// # Errors
    /// * `StoreUnavailable` - The backing store failed
    pub async fn stats(&self) -> Result<ServiceStats, ChatError> {
        Ok(ServiceStats {
            uptime: self.started_at.elapsed(),
            subscribers: self.hub.subscriber_count().await,
            online_users: self.hub.online_users().await.len(),
            total_messages: self.message_store.count().await?,
        })
    }

    async fn publish_typing(&self) {
        let users = {
            let typing = self.typing.read().await;
            let mut users: Vec<String> = typing.iter().cloned().collect();
            users.sort();
            users
        };
        self.hub.publish(ChatEvent::Typing { users }).await;
    }
}
