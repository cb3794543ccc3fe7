//! MessagePusher trait 定義
//!
//! room 単位のフレーム配信（ブロードキャスト）を抽象化します。

use async_trait::async_trait;

use super::{RoomKey, SessionId};

/// Outcome of one broadcast
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Number of sessions the payload was queued for
    pub delivered: usize,
    /// Sessions removed from the registry because delivery failed
    pub evicted: Vec<SessionId>,
}

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Queue a payload for every session currently joined to `room`.
    ///
    /// Individual delivery failures evict the failing session and are never
    /// reported as an error of the broadcast itself.
    async fn broadcast(&self, room: &RoomKey, payload: &str) -> BroadcastReport;
}
