pub mod messages;
pub mod users;

pub use messages::InMemoryMessageStore;
pub use users::InMemoryCredentialStore;
