pub mod hub;
pub mod subscriber;

pub use hub::BroadcastHub;
pub use subscriber::ConnectionId;
pub use subscriber::SubscriberHandle;
pub use subscriber::SubscriberState;
