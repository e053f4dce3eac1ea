use async_trait::async_trait;

use super::errors::MessageStoreError;
use super::models::MessageId;
use super::models::MessageWithReactions;
use super::models::NewMessage;
use super::models::ReactionUpdate;
use super::models::StoredMessage;
use crate::domain::user::models::Username;

/// Repository port for the append-only message log.
///
/// The store assigns ids and timestamps at persist time. Assigned timestamps
/// are strictly increasing in acceptance order, and read-back order agrees
/// with them, so the log itself is the ordering authority. The store also
/// keeps the reaction ledger for the messages it holds.
#[async_trait]
pub trait MessageStore: Send + Sync + 'static {
    /// Persist a draft message, assigning its id and timestamp.
    ///
    /// # Arguments
    /// * `draft` - Sender and content, as submitted by the client
    ///
    /// # Returns
    /// The stored message with assigned id and timestamp
    ///
    /// # Errors
    /// * `Unavailable` - The backing store failed
    async fn append(&self, draft: NewMessage) -> Result<StoredMessage, MessageStoreError>;

    /// Retrieve the most recent messages, newest first, each joined with its
    /// current reaction state.
    ///
    /// Returns all messages when fewer than `limit` exist.
    ///
    /// # Arguments
    /// * `limit` - Maximum number of messages to return
    ///
    /// # Errors
    /// * `Unavailable` - The backing store failed
    async fn recent(&self, limit: usize) -> Result<Vec<MessageWithReactions>, MessageStoreError>;

    /// Toggle `username`'s reaction with `emoji` on a message.
    ///
    /// Adds the user to the emoji's reaction set, or removes them if already
    /// present. An emoji whose last user withdrew disappears entirely.
    ///
    /// # Arguments
    /// * `message_id` - Message being reacted to
    /// * `emoji` - Reaction emoji
    /// * `username` - User toggling the reaction
    ///
    /// # Returns
    /// Post-toggle state of that emoji on that message
    ///
    /// # Errors
    /// * `MessageNotFound` - No message with this id
    /// * `Unavailable` - The backing store failed
    async fn toggle_reaction(
        &self,
        message_id: MessageId,
        emoji: &str,
        username: &Username,
    ) -> Result<ReactionUpdate, MessageStoreError>;

    /// Total number of messages retained.
    ///
    /// # Errors
    /// * `Unavailable` - The backing store failed
    async fn count(&self) -> Result<usize, MessageStoreError>;
}
