//! Request handlers.

mod credentials;
mod http;
mod websocket;

pub use http::{get_room_messages, get_rooms, health_check, post_room_message};
pub use websocket::websocket_handler;
