use std::fmt;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::message::errors::ContentError;
use crate::domain::message::errors::MessageIdError;
use crate::domain::user::models::Username;

/// Message unique identifier value object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub Uuid);

impl MessageId {
    /// Generate a new random message ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a message ID from string.
    ///
    /// # Arguments
    /// * `s` - UUID string to parse
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, MessageIdError> {
        Uuid::parse_str(s)
            .map(MessageId)
            .map_err(|e| MessageIdError::InvalidFormat(e.to_string()))
    }

    /// Get a reference to the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Consume self and return the inner UUID.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Message content value object.
///
/// The only structural rule is that content must not be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MessageContent(String);

impl MessageContent {
    /// Create a new validated message content.
    ///
    /// # Arguments
    /// * `content` - Raw message content string
    ///
    /// # Errors
    /// * `Empty` - Content is the empty string
    pub fn new(content: String) -> Result<Self, ContentError> {
        if content.is_empty() {
            return Err(ContentError::Empty);
        }
        Ok(Self(content))
    }

    /// Get content as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A message as submitted by a client, before the store has accepted it.
///
/// Carries no id and no timestamp on purpose: both are assigned by the
/// store at persist time, so client clocks never influence ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub sender: Username,
    pub content: MessageContent,
}

/// A message as persisted, with store-assigned id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredMessage {
    pub id: MessageId,
    pub sender: Username,
    pub content: MessageContent,
    pub timestamp: DateTime<Utc>,
}

/// Reaction state for one emoji on one message: which users currently have
/// it applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reaction {
    pub emoji: String,
    pub users: Vec<String>,
}

/// A history entry: one stored message joined with its current reaction
/// state.
///
/// Broadcasts only carry reaction deltas, so reloading history is how a
/// reconnecting client recovers the reactions it missed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageWithReactions {
    #[serde(flatten)]
    pub message: StoredMessage,
    pub reactions: Vec<Reaction>,
}

/// Post-toggle snapshot of one reaction, broadcast to subscribers.
///
/// A count of zero means the last user withdrew and the reaction is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReactionUpdate {
    pub message_id: MessageId,
    pub emoji: String,
    pub count: usize,
    pub users: Vec<String>,
}

/// Point-in-time operational counters for health reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStats {
    pub uptime: Duration,
    pub subscribers: usize,
    pub online_users: usize,
    pub total_messages: usize,
}
