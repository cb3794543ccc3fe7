//! Data Transfer Objects (DTOs) for the chat server.
//!
//! DTOs are organized by protocol:
//! - `websocket`: wire frames and inbound submissions
//! - `http`: HTTP API request/response bodies
//! - `record`: persisted message lines

pub mod conversion;
pub mod http;
pub mod record;
pub mod websocket;
