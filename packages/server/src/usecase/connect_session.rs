//! UseCase: セッション接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectSessionUseCase の authorize / join / history_frame / announce_join
//!
//! ### なぜこのテストが必要か
//! - 認証・room key の検証に失敗した接続が状態を一切残さないことを保証
//! - 新規セッションに HISTORY が JOIN より先に届く前提となる部品の検証
//!
//! ### どのような状況を想定しているか
//! - 正常系：認証成功、履歴の取得、JOIN の通知
//! - 異常系：認証失敗、room key 不正、履歴取得失敗

use std::sync::Arc;

use banter_shared::time::Clock;
use tokio::sync::mpsc;

use crate::{
    domain::{
        Authenticator, BroadcastReport, HandshakeRequest, MessagePusher, MessageStore, Principal,
        RoomKey, RoomRegistry, Session,
    },
    infrastructure::dto::websocket::{Frame, HistoryFrame, PresenceFrame},
};

use super::error::HandshakeError;

/// A freshly joined session together with the receiving end of its outbound queue
pub struct Connection {
    pub session: Arc<Session>,
    pub outbound: mpsc::Receiver<String>,
}

/// セッション接続のユースケース
pub struct ConnectSessionUseCase {
    authenticator: Arc<Authenticator>,
    registry: Arc<dyn RoomRegistry>,
    store: Arc<dyn MessageStore>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    /// Number of messages replayed in the HISTORY frame
    history_limit: usize,
    /// Capacity of each session's outbound queue
    outbound_buffer: usize,
}

impl ConnectSessionUseCase {
    pub fn new(
        authenticator: Arc<Authenticator>,
        registry: Arc<dyn RoomRegistry>,
        store: Arc<dyn MessageStore>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        history_limit: usize,
        outbound_buffer: usize,
    ) -> Self {
        Self {
            authenticator,
            registry,
            store,
            message_pusher,
            clock,
            history_limit,
            outbound_buffer: outbound_buffer.max(1),
        }
    }

    /// Handshake check: parse the room key and resolve the principal.
    ///
    /// Nothing is registered here, so a refusal leaves no state behind.
    pub async fn authorize(
        &self,
        request: &HandshakeRequest,
    ) -> Result<(RoomKey, Principal), HandshakeError> {
        let room = RoomKey::from_target_path(&request.path)?;
        let principal = self
            .authenticator
            .authenticate(request)
            .await
            .ok_or(HandshakeError::Rejected)?;
        Ok((room, principal))
    }

    /// Create the session and register it in the room (`HANDSHAKING → JOINED`).
    pub async fn join(&self, room: RoomKey, principal: Principal) -> Connection {
        let (tx, rx) = mpsc::channel(self.outbound_buffer);
        let session = Arc::new(Session::new(room, principal, tx));
        self.registry.join(session.clone()).await;

        tracing::info!(
            "Principal {} ('{}') joined room '{}' as session {}",
            session.principal().id,
            session.principal().name,
            session.room(),
            session.id()
        );

        Connection {
            session,
            outbound: rx,
        }
    }

    /// `authorize` followed by `join`
    pub async fn execute(&self, request: &HandshakeRequest) -> Result<Connection, HandshakeError> {
        let (room, principal) = self.authorize(request).await?;
        Ok(self.join(room, principal).await)
    }

    /// HISTORY frame with the most recent messages of the session's room.
    ///
    /// A failing store yields an empty history; the session stays joined.
    pub async fn history_frame(&self, session: &Session) -> Frame {
        let messages = match self.store.recent(session.room(), self.history_limit).await {
            Ok(messages) => messages,
            Err(e) => {
                tracing::error!(
                    "Failed to load history of room '{}' for session {}: {}",
                    session.room(),
                    session.id(),
                    e
                );
                Vec::new()
            }
        };
        Frame::History(HistoryFrame::new(session.room(), &messages))
    }

    /// Broadcast JOIN for the session to its whole room, the session included.
    pub async fn announce_join(&self, session: &Session) -> BroadcastReport {
        let frame = Frame::Join(PresenceFrame::new(
            session.room(),
            session.principal(),
            self.clock.now(),
        ));
        match frame.to_json() {
            Ok(payload) => self.message_pusher.broadcast(session.room(), &payload).await,
            Err(e) => {
                tracing::warn!("Failed to encode JOIN for session {}: {}", session.id(), e);
                BroadcastReport::default()
            }
        }
    }
}
