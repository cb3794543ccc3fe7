//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() / post_as() メソッド
//! - 受信 JSON の検証、永続化、room 全体へのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 送信者本人を含む room の全員に CHAT が届くことを保証
//! - 永続化に失敗したメッセージが配信されないこと（fail closed）を保証
//! - 不正な投稿が永続化もブロードキャストもされずに破棄されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：テキスト / 画像メッセージの送信
//! - 異常系：不正な JSON、空の投稿、永続化失敗
//! - エッジケース：別 room のセッションには届かない

use std::sync::Arc;

use crate::{
    domain::{ChatBody, Message, MessagePusher, MessageStore, NewMessage, Principal, RoomKey, Session},
    infrastructure::dto::websocket::{ChatFrame, ChatSubmission, Frame},
};

use super::error::SubmitError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Message Store（メッセージ永続化の抽象化）
    store: Arc<dyn MessageStore>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl SendMessageUseCase {
    pub fn new(store: Arc<dyn MessageStore>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            store,
            message_pusher,
        }
    }

    /// Handle one inbound text frame of a joined session.
    ///
    /// # Returns
    ///
    /// * `Ok(Message)` - the persisted message, already broadcast to the room
    /// * `Err(SubmitError)` - nothing was broadcast
    pub async fn execute(&self, session: &Session, raw: &str) -> Result<Message, SubmitError> {
        let submission: ChatSubmission =
            serde_json::from_str(raw).map_err(SubmitError::Malformed)?;
        let body = ChatBody::try_from(submission)?;
        self.publish(NewMessage::new(
            session.room().clone(),
            session.principal().clone(),
            body,
        ))
        .await
    }

    /// Post into a room on behalf of a principal that holds no session there.
    pub async fn post_as(
        &self,
        principal: Principal,
        room: RoomKey,
        submission: ChatSubmission,
    ) -> Result<Message, SubmitError> {
        let body = ChatBody::try_from(submission)?;
        self.publish(NewMessage::new(room, principal, body)).await
    }

    /// Persist first, then fan out. A store failure stops the message here.
    async fn publish(&self, message: NewMessage) -> Result<Message, SubmitError> {
        let persisted = self.store.append(message).await.inspect_err(|e| {
            tracing::error!("Failed to persist message: {}", e);
        })?;

        let payload = Frame::Chat(ChatFrame::from(&persisted))
            .to_json()
            .map_err(SubmitError::Encoding)?;
        let report = self
            .message_pusher
            .broadcast(&persisted.room, &payload)
            .await;

        tracing::info!(
            "Message {} from '{}' broadcast to room '{}' ({} delivered, {} evicted)",
            persisted.id.value(),
            persisted.sender_name,
            persisted.room,
            report.delivered,
            report.evicted.len()
        );
        Ok(persisted)
    }
}
