pub mod message;

pub use message::FileMessageStore;
