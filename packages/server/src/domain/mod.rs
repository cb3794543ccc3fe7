//! Domain layer for the chat server.
//!
//! This module contains business rules that are independent of
//! data transfer objects (DTOs) and infrastructure concerns, plus the
//! traits through which the core talks to its collaborators.

pub mod auth;
pub mod entity;
pub mod error;
pub mod pusher;
pub mod repository;
pub mod session;
pub mod value_object;

pub use auth::{AuthStrategy, Authenticator, HandshakeRequest};
pub use entity::{ChatBody, Message, NewMessage, Principal};
pub use error::{AuthError, DeliveryError, StoreError, ValueObjectError};
pub use pusher::{BroadcastReport, MessagePusher};
pub use repository::{MessageStore, RoomRegistry};
pub use session::{PusherChannel, Session, SessionState};
pub use value_object::{ImageUrl, MessageContent, MessageId, PrincipalId, Role, RoomKey, SessionId};
