//! UseCase: メッセージ履歴取得処理

use std::sync::Arc;

use crate::domain::{Message, MessageStore, RoomKey, StoreError};

/// room のメッセージ履歴取得のユースケース
pub struct GetHistoryUseCase {
    store: Arc<dyn MessageStore>,
    /// Upper bound (and default) of returned messages
    history_limit: usize,
}

impl GetHistoryUseCase {
    pub fn new(store: Arc<dyn MessageStore>, history_limit: usize) -> Self {
        Self {
            store,
            history_limit: history_limit.max(1),
        }
    }

    /// Most recent messages of `room`, oldest first.
    ///
    /// `limit` is clamped to `1..=history_limit`; `None` means `history_limit`.
    pub async fn execute(
        &self,
        room: &RoomKey,
        limit: Option<usize>,
    ) -> Result<Vec<Message>, StoreError> {
        let limit = limit
            .unwrap_or(self.history_limit)
            .clamp(1, self.history_limit);
        self.store.recent(room, limit).await
    }
}
