use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Duration;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::message::errors::MessageStoreError;
use crate::domain::message::models::MessageId;
use crate::domain::message::models::MessageWithReactions;
use crate::domain::message::models::NewMessage;
use crate::domain::message::models::Reaction;
use crate::domain::message::models::ReactionUpdate;
use crate::domain::message::models::StoredMessage;
use crate::domain::message::ports::MessageStore;
use crate::domain::user::models::Username;

#[derive(Default)]
struct MessageLog {
    entries: Vec<StoredMessage>,
    reactions: HashMap<MessageId, Vec<Reaction>>,
}

/// Message store backed by process memory.
///
/// Reference adapter for tests and single-process deployments. Everything
/// happens under one lock: append assigns the id and timestamp while
/// holding it, so acceptance order, timestamp order, and read-back order
/// are all the same order.
#[derive(Default)]
pub struct InMemoryMessageStore {
    log: RwLock<MessageLog>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(message_id: MessageId, reaction: &Reaction) -> ReactionUpdate {
        ReactionUpdate {
            message_id,
            emoji: reaction.emoji.clone(),
            count: reaction.users.len(),
            users: reaction.users.clone(),
        }
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(&self, draft: NewMessage) -> Result<StoredMessage, MessageStoreError> {
        let mut log = self.log.write().await;

        // Wall clock reads can repeat or step backwards; an assigned
        // timestamp never ties or precedes its predecessor.
        let mut timestamp = Utc::now();
        if let Some(last) = log.entries.last() {
            if timestamp <= last.timestamp {
                timestamp = last.timestamp + Duration::microseconds(1);
            }
        }

        let stored = StoredMessage {
            id: MessageId::new(),
            sender: draft.sender,
            content: draft.content,
            timestamp,
        };
        log.entries.push(stored.clone());

        Ok(stored)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<MessageWithReactions>, MessageStoreError> {
        let log = self.log.read().await;
        Ok(log
            .entries
            .iter()
            .rev()
            .take(limit)
            .map(|message| MessageWithReactions {
                message: message.clone(),
                reactions: log.reactions.get(&message.id).cloned().unwrap_or_default(),
            })
            .collect())
    }

    async fn toggle_reaction(
        &self,
        message_id: MessageId,
        emoji: &str,
        username: &Username,
    ) -> Result<ReactionUpdate, MessageStoreError> {
        let mut log = self.log.write().await;

        if !log.entries.iter().any(|m| m.id == message_id) {
            return Err(MessageStoreError::MessageNotFound(message_id));
        }

        let reactions = log.reactions.entry(message_id).or_default();

        let update = match reactions.iter().position(|r| r.emoji == emoji) {
            Some(index) => {
                let users = &mut reactions[index].users;
                match users.iter().position(|u| u == username.as_str()) {
                    // The user had this reaction: withdraw it.
                    Some(user_index) => {
                        users.remove(user_index);
                        if reactions[index].users.is_empty() {
                            reactions.remove(index);
                            ReactionUpdate {
                                message_id,
                                emoji: emoji.to_string(),
                                count: 0,
                                users: Vec::new(),
                            }
                        } else {
                            Self::snapshot(message_id, &reactions[index])
                        }
                    }
                    // Another user joins an existing reaction.
                    None => {
                        users.push(username.as_str().to_string());
                        Self::snapshot(message_id, &reactions[index])
                    }
                }
            }
            // First use of this emoji on this message.
            None => {
                let reaction = Reaction {
                    emoji: emoji.to_string(),
                    users: vec![username.as_str().to_string()],
                };
                let update = Self::snapshot(message_id, &reaction);
                reactions.push(reaction);
                update
            }
        };

        let emptied = reactions.is_empty();
        if emptied {
            log.reactions.remove(&message_id);
        }

        Ok(update)
    }

    async fn count(&self) -> Result<usize, MessageStoreError> {
        Ok(self.log.read().await.entries.len())
    }
}
