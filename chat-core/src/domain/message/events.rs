use serde::Serialize;

use super::models::ReactionUpdate;
use super::models::StoredMessage;

/// Events fanned out to subscribers.
///
/// One enum multiplexes every outbound topic; the serialized form is tagged
/// with a `type` field so transports can forward events to clients as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A new chat message was persisted.
    Message(StoredMessage),

    /// The online roster changed. Carries the full set, sorted.
    Presence { users: Vec<String> },

    /// The set of currently typing users changed. Carries the full set, sorted.
    Typing { users: Vec<String> },

    /// A reaction was added or withdrawn.
    Reaction(ReactionUpdate),
}

impl ChatEvent {
    /// Get the event type name, as it appears in the serialized tag.
    pub fn event_type(&self) -> &str {
        match self {
            ChatEvent::Message(_) => "message",
            ChatEvent::Presence { .. } => "presence",
            ChatEvent::Typing { .. } => "typing",
            ChatEvent::Reaction(_) => "reaction",
        }
    }
}
