//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::sync::Arc;

use async_trait::async_trait;

use super::{Message, NewMessage, RoomKey, Session, StoreError};

/// Room Registry trait
///
/// In-memory mapping from room key to the sessions currently joined to it.
/// Implementations must serialize `join`, `leave` and `members_of` so that a
/// session is never observed half-registered.
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// Register a handshaking session under its own room key and mark it joined.
    async fn join(&self, session: Arc<Session>);

    /// Remove a session from its room, pruning the room once it is empty.
    ///
    /// Returns `false` when the session was not registered.
    async fn leave(&self, session: &Session) -> bool;

    /// Point-in-time snapshot of the sessions joined to `room`, in join order.
    async fn members_of(&self, room: &RoomKey) -> Vec<Arc<Session>>;

    /// Snapshot of every non-empty room, sorted by room key.
    async fn rooms(&self) -> Vec<(RoomKey, Vec<Arc<Session>>)>;
}

/// Message Store trait
///
/// 永続化されたチャット履歴へのインターフェース（追記専用）。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Durably append a message, assigning its id and creation timestamp.
    async fn append(&self, message: NewMessage) -> Result<Message, StoreError>;

    /// At most `limit` most recent messages of `room`, oldest first.
    async fn recent(&self, room: &RoomKey, limit: usize) -> Result<Vec<Message>, StoreError>;
}
