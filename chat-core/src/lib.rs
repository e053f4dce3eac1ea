//! Core of a minimal chat service: registration and login, session tokens,
//! an append-only message log, and best-effort fan-out to subscribers.
//!
//! Transports are out of scope. An embedding server drives this crate
//! through [`AuthService`] and [`ChatService`] and pumps events out of the
//! [`SubscriberHandle`]s returned by [`ChatService::join`]. Persistence sits
//! behind the [`CredentialStore`] and [`MessageStore`] ports; the in-memory
//! adapters under [`outbound`] are the reference implementations.

pub mod broadcast;
pub mod config;
pub mod domain;
pub mod outbound;

// Re-export commonly used types
pub use broadcast::BroadcastHub;
pub use broadcast::ConnectionId;
pub use broadcast::SubscriberHandle;
pub use broadcast::SubscriberState;
pub use config::ChatConfig;
pub use domain::message::events::ChatEvent;
pub use domain::message::models::*;
pub use domain::message::ports::MessageStore;
pub use domain::message::service::ChatService;
pub use domain::message::service::DEFAULT_RECENT_LIMIT;
pub use domain::user::models::*;
pub use domain::user::ports::CredentialStore;
pub use domain::user::service::AuthService;
