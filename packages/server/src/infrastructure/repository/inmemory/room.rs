//! InMemory Room Registry 実装
//!
//! ドメイン層が定義する RoomRegistry trait の具体的な実装。
//! `room key → 参加中セッション` の HashMap を単一の Mutex で保護します。
//!
//! ## 不変条件
//!
//! - マップに残る room は必ず 1 つ以上のセッションを持つ（空になった room は即座に削除）
//! - セッションは自身の room key の下にのみ登録される
//! - `members_of` はロック中に取得したスナップショットを返すため、
//!   並行する join / leave の途中状態が観測されることはない

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{RoomKey, RoomRegistry, Session};

/// インメモリ Room Registry 実装
#[derive(Default)]
pub struct InMemoryRoomRegistry {
    /// room key → 参加順のセッション一覧
    rooms: Mutex<HashMap<RoomKey, Vec<Arc<Session>>>>,
}

impl InMemoryRoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn join(&self, session: Arc<Session>) {
        let mut rooms = self.rooms.lock().await;
        session.mark_joined();
        tracing::debug!(
            "Session {} joined room '{}'",
            session.id(),
            session.room()
        );
        rooms
            .entry(session.room().clone())
            .or_default()
            .push(session);
    }

    async fn leave(&self, session: &Session) -> bool {
        let mut rooms = self.rooms.lock().await;
        let Some(members) = rooms.get_mut(session.room()) else {
            return false;
        };

        let before = members.len();
        members.retain(|member| member.id() != session.id());
        let removed = members.len() != before;

        if members.is_empty() {
            rooms.remove(session.room());
            tracing::debug!("Room '{}' is empty and was pruned", session.room());
        }
        if removed {
            tracing::debug!("Session {} left room '{}'", session.id(), session.room());
        }
        removed
    }

    async fn members_of(&self, room: &RoomKey) -> Vec<Arc<Session>> {
        let rooms = self.rooms.lock().await;
        rooms.get(room).cloned().unwrap_or_default()
    }

    async fn rooms(&self) -> Vec<(RoomKey, Vec<Arc<Session>>)> {
        let rooms = self.rooms.lock().await;
        let mut snapshot: Vec<(RoomKey, Vec<Arc<Session>>)> = rooms
            .iter()
            .map(|(key, members)| (key.clone(), members.clone()))
            .collect();
        snapshot.sort_by(|a, b| a.0.cmp(&b.0));
        snapshot
    }
}
