use thiserror::Error;

use super::models::MessageId;
use crate::domain::user::errors::UsernameError;

/// Error for MessageId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessageIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for message content validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("Message content must not be empty")]
    Empty,
}

/// Error for message store operations
#[derive(Debug, Clone, Error)]
pub enum MessageStoreError {
    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),

    #[error("Message store unavailable: {0}")]
    Unavailable(String),
}

/// Top-level error for chat operations
#[derive(Debug, Error)]
pub enum ChatError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Invalid content: {0}")]
    InvalidContent(#[from] ContentError),

    #[error("Invalid message id: {0}")]
    InvalidMessageId(#[from] MessageIdError),

    #[error("Reaction emoji must not be empty")]
    EmptyEmoji,

    // Domain-level errors
    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),

    // Infrastructure errors
    #[error("Message store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<MessageStoreError> for ChatError {
    fn from(err: MessageStoreError) -> Self {
        match err {
            MessageStoreError::MessageNotFound(id) => ChatError::MessageNotFound(id),
            MessageStoreError::Unavailable(cause) => ChatError::StoreUnavailable(cause),
        }
    }
}
