//! UseCase: セッション切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectSessionUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 切断したセッションが room から外れ、残りのメンバーに LEAVE が届くことを保証
//! - 同じセッションの切断が二重に処理されても LEAVE が一度しか送られないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：切断と LEAVE の通知
//! - エッジケース：二重切断、退去済み（evicted）セッションの切断

use std::sync::Arc;

use banter_shared::time::Clock;

use crate::{
    domain::{MessagePusher, RoomRegistry, Session},
    infrastructure::dto::websocket::{Frame, PresenceFrame},
};

/// セッション切断のユースケース
pub struct DisconnectSessionUseCase {
    registry: Arc<dyn RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl DisconnectSessionUseCase {
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            clock,
        }
    }

    /// Close the session and tell the rest of its room.
    ///
    /// Returns `false` when the session was already closed; no LEAVE is sent then.
    pub async fn execute(&self, session: &Session) -> bool {
        self.registry.leave(session).await;
        if !session.mark_closed() {
            return false;
        }

        tracing::info!(
            "Principal {} ('{}') left room '{}' (session {})",
            session.principal().id,
            session.principal().name,
            session.room(),
            session.id()
        );

        let frame = Frame::Leave(PresenceFrame::new(
            session.room(),
            session.principal(),
            self.clock.now(),
        ));
        match frame.to_json() {
            Ok(payload) => {
                let report = self.message_pusher.broadcast(session.room(), &payload).await;
                tracing::debug!(
                    "LEAVE for session {} delivered to {} session(s)",
                    session.id(),
                    report.delivered
                );
            }
            Err(e) => {
                tracing::warn!("Failed to encode LEAVE for session {}: {}", session.id(), e);
            }
        }
        true
    }

    /// Drop a session that never became visible to its room (no LEAVE is sent).
    pub async fn abandon(&self, session: &Session) {
        self.registry.leave(session).await;
        if session.mark_closed() {
            tracing::info!(
                "Session {} in room '{}' was abandoned before announcing its join",
                session.id(),
                session.room()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Principal, PrincipalId, Role, RoomKey, SessionState},
        infrastructure::{message_pusher::BroadcastEngine, repository::InMemoryRoomRegistry},
    };
    use banter_shared::time::FixedClock;
    use tokio::sync::mpsc;

    fn create_usecase() -> (DisconnectSessionUseCase, Arc<InMemoryRoomRegistry>) {
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let pusher = Arc::new(BroadcastEngine::new(registry.clone()));
        let usecase = DisconnectSessionUseCase::new(
            registry.clone(),
            pusher,
            Arc::new(FixedClock::from_millis(0)),
        );
        (usecase, registry)
    }

    async fn join(
        registry: &InMemoryRoomRegistry,
        room: &str,
        id: i64,
        name: &str,
    ) -> (Arc<Session>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(8);
        let session = Arc::new(Session::new(
            RoomKey::new(room.to_string()).unwrap(),
            Principal::new(PrincipalId::new(id), name, &[Role::User]),
            tx,
        ));
        registry.join(session.clone()).await;
        (session, rx)
    }

    #[tokio::test]
    async fn test_disconnect_broadcasts_leave_to_remaining_members() {
        // テスト項目: 切断すると room から外れ、残りのメンバーに LEAVE が届く
        // given (前提条件):
        let (usecase, registry) = create_usecase();
        let (alice, _alice_rx) = join(&registry, "7", 1, "alice").await;
        let (_bob, mut bob_rx) = join(&registry, "7", 2, "bob").await;

        // when (操作):
        let closed = usecase.execute(&alice).await;

        // then (期待する結果):
        assert!(closed);
        assert_eq!(alice.state(), SessionState::Closed);
        assert_eq!(registry.members_of(alice.room()).await.len(), 1);
        let frame: Frame = serde_json::from_str(&bob_rx.recv().await.unwrap()).unwrap();
        let Frame::Leave(leave) = frame else {
            panic!("expected LEAVE frame");
        };
        assert_eq!(leave.sender_id, 1);
        assert_eq!(leave.sender_name, "alice");
    }

    #[tokio::test]
    async fn test_second_disconnect_sends_no_leave() {
        // テスト項目: 同じセッションを二度切断しても LEAVE は一度だけ
        // given (前提条件):
        let (usecase, registry) = create_usecase();
        let (alice, _alice_rx) = join(&registry, "7", 1, "alice").await;
        let (_bob, mut bob_rx) = join(&registry, "7", 2, "bob").await;
        assert!(usecase.execute(&alice).await);
        bob_rx.recv().await.unwrap();

        // when (操作):
        let closed_again = usecase.execute(&alice).await;

        // then (期待する結果):
        assert!(!closed_again);
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_evicted_session_still_announces_leave() {
        // テスト項目: 配信失敗で registry から外されたセッションも、切断時に LEAVE が送られる
        // given (前提条件):
        let (usecase, registry) = create_usecase();
        let (alice, _alice_rx) = join(&registry, "7", 1, "alice").await;
        let (_bob, mut bob_rx) = join(&registry, "7", 2, "bob").await;
        registry.leave(&alice).await;
        alice.evict();

        // when (操作):
        let closed = usecase.execute(&alice).await;

        // then (期待する結果):
        assert!(closed);
        let frame: Frame = serde_json::from_str(&bob_rx.recv().await.unwrap()).unwrap();
        assert!(matches!(frame, Frame::Leave(ref leave) if leave.sender_id == 1));
    }

    #[tokio::test]
    async fn test_abandon_sends_no_leave() {
        // テスト項目: JOIN を通知する前に破棄したセッションは LEAVE を送らずに閉じられる
        // given (前提条件):
        let (usecase, registry) = create_usecase();
        let (alice, _alice_rx) = join(&registry, "7", 1, "alice").await;
        let (_bob, mut bob_rx) = join(&registry, "7", 2, "bob").await;

        // when (操作):
        usecase.abandon(&alice).await;

        // then (期待する結果):
        assert_eq!(alice.state(), SessionState::Closed);
        assert_eq!(registry.members_of(alice.room()).await.len(), 1);
        assert!(bob_rx.try_recv().is_err());
        assert!(!usecase.execute(&alice).await);
    }

    #[tokio::test]
    async fn test_last_member_leaving_prunes_room() {
        // テスト項目: 最後のメンバーが抜けると room は一覧から消える
        // given (前提条件):
        let (usecase, registry) = create_usecase();
        let (alice, _alice_rx) = join(&registry, "7", 1, "alice").await;

        // when (操作):
        usecase.execute(&alice).await;

        // then (期待する結果):
        assert!(registry.rooms().await.is_empty());
    }
}
