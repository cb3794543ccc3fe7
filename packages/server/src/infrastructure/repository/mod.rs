//! Repository implementations.
//!
//! - `inmemory`: room registry and message store held in process memory
//! - `file`: message store persisted as JSON Lines

pub mod file;
pub mod inmemory;

pub use file::FileMessageStore;
pub use inmemory::{InMemoryMessageStore, InMemoryRoomRegistry};
