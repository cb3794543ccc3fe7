//! InMemory Message Store 実装
//!
//! プロセス内のみで保持される追記専用のメッセージログ。
//! `--data-dir` 未指定時やテストで使用します。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use banter_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{Message, MessageId, MessageStore, NewMessage, RoomKey, StoreError};

#[derive(Default)]
struct Log {
    last_id: i64,
    rooms: HashMap<RoomKey, Vec<Message>>,
}

/// インメモリ Message Store 実装
pub struct InMemoryMessageStore {
    log: Mutex<Log>,
    clock: Arc<dyn Clock>,
}

impl InMemoryMessageStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            log: Mutex::new(Log::default()),
            clock,
        }
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(&self, message: NewMessage) -> Result<Message, StoreError> {
        let mut log = self.log.lock().await;
        log.last_id += 1;
        let persisted = Message::from_new(message, MessageId::new(log.last_id), self.clock.now());
        log.rooms
            .entry(persisted.room.clone())
            .or_default()
            .push(persisted.clone());
        Ok(persisted)
    }

    async fn recent(&self, room: &RoomKey, limit: usize) -> Result<Vec<Message>, StoreError> {
        let log = self.log.lock().await;
        let messages = log.rooms.get(room).map(Vec::as_slice).unwrap_or_default();
        let start = messages.len().saturating_sub(limit);
        Ok(messages[start..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatBody, Principal, PrincipalId, Role};
    use banter_shared::time::FixedClock;

    fn create_test_store() -> InMemoryMessageStore {
        InMemoryMessageStore::new(Arc::new(FixedClock::from_millis(1_700_000_000_000)))
    }

    fn new_message(room: &str, text: &str) -> NewMessage {
        NewMessage::new(
            RoomKey::new(room.to_string()).unwrap(),
            Principal::new(PrincipalId::new(1), "alice", &[Role::User]),
            ChatBody::from_parts(Some(text.to_string()), None).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_ids_and_timestamp() {
        // テスト項目: append で id と作成時刻が割り当てられる
        // given (前提条件):
        let store = create_test_store();

        // when (操作):
        let first = store.append(new_message("7", "one")).await.unwrap();
        let second = store.append(new_message("8", "two")).await.unwrap();

        // then (期待する結果):
        assert_eq!(first.id, MessageId::new(1));
        assert_eq!(second.id, MessageId::new(2));
        assert_eq!(first.created_at.timestamp_millis(), 1_700_000_000_000);
    }

    #[tokio::test]
    async fn test_recent_returns_tail_oldest_first() {
        // テスト項目: recent は直近 limit 件を古い順で返す
        // given (前提条件):
        let store = create_test_store();
        for text in ["one", "two", "three", "four"] {
            store.append(new_message("7", text)).await.unwrap();
        }

        // when (操作):
        let room = RoomKey::new("7".to_string()).unwrap();
        let recent = store.recent(&room, 2).await.unwrap();

        // then (期待する結果):
        let contents: Vec<_> = recent.iter().filter_map(|m| m.content()).collect();
        assert_eq!(contents, vec!["three", "four"]);
    }

    #[tokio::test]
    async fn test_recent_for_unknown_room_is_empty() {
        // テスト項目: メッセージの無い room の recent は空
        // given (前提条件):
        let store = create_test_store();
        store.append(new_message("7", "one")).await.unwrap();

        // when (操作):
        let room = RoomKey::new("8".to_string()).unwrap();
        let recent = store.recent(&room, 50).await.unwrap();

        // then (期待する結果):
        assert!(recent.is_empty());
    }
}
