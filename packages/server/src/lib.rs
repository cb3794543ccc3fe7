//! Room-based WebSocket chat server library.
//!
//! Connections are authenticated at handshake, grouped into rooms keyed by
//! the trailing segment of the connection path, replayed the recent room
//! history and then kept in sync through room-wide broadcasts.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
