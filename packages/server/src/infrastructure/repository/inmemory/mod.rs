pub mod message;
pub mod room;

pub use message::InMemoryMessageStore;
pub use room::InMemoryRoomRegistry;
