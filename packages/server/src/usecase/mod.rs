//! UseCase layer
//!
//! Application-level operations composed from the domain traits. The UI
//! layer only talks to these.

pub mod connect_session;
pub mod disconnect_session;
pub mod error;
pub mod get_history;
pub mod get_rooms;
pub mod send_message;

pub use connect_session::{Connection, ConnectSessionUseCase};
pub use disconnect_session::DisconnectSessionUseCase;
pub use error::{HandshakeError, SubmitError};
pub use get_history::GetHistoryUseCase;
pub use get_rooms::{GetRoomsUseCase, RoomSnapshot};
pub use send_message::SendMessageUseCase;
