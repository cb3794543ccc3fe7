//! Broadcast Engine: room 単位のフレーム配信
//!
//! ## 責務
//!
//! - Room Registry のスナップショットを取り、各セッションの送信キューへ配信する
//! - 配信に失敗したセッションを Registry から除外（evict）する
//!
//! ## 設計ノート
//!
//! 配信は `try_send` でキューに積むだけなので、遅いピアが他のピアへの配信を止めることはない。
//! 実際のソケット書き込みはセッションごとの writer タスク（UI 層）が行う。
//! 除外されたセッションの接続は閉じず、liveness フラグを落として接続タスクに通知するのみ。

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{BroadcastReport, MessagePusher, RoomKey, RoomRegistry};

pub struct BroadcastEngine {
    registry: Arc<dyn RoomRegistry>,
}

impl BroadcastEngine {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl MessagePusher for BroadcastEngine {
    async fn broadcast(&self, room: &RoomKey, payload: &str) -> BroadcastReport {
        let members = self.registry.members_of(room).await;
        let mut report = BroadcastReport::default();

        for member in members {
            // ブロードキャストでは一部の送信失敗を許容
            match member.deliver(payload) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        "Failed to deliver to session {} in room '{}': {}. Evicting.",
                        member.id(),
                        room,
                        e
                    );
                    self.registry.leave(&member).await;
                    member.evict();
                    report.evicted.push(member.id());
                }
            }
        }

        tracing::debug!(
            "Broadcast to room '{}': {} delivered, {} evicted",
            room,
            report.delivered,
            report.evicted.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Principal, PrincipalId, Role, Session},
        infrastructure::repository::InMemoryRoomRegistry,
    };
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - broadcast: room の全メンバーへの配信
    // - 配信失敗時の evict（部分失敗を呼び出し側へ伝播しない）
    //
    // 【どのようなシナリオをテストするか】
    // 1. 全員に届く
    // 2. 切断済みのセッションは除外され、残りには届く
    // 3. キューが満杯のセッションも除外される
    // 4. 他の room には届かない
    // ========================================

    fn create_test_session(
        room: &str,
        id: i64,
        buffer: usize,
    ) -> (Arc<Session>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(buffer);
        let principal = Principal::new(PrincipalId::new(id), format!("user-{id}"), &[Role::User]);
        let room = RoomKey::new(room.to_string()).unwrap();
        (Arc::new(Session::new(room, principal, tx)), rx)
    }

    fn create_test_engine() -> (BroadcastEngine, Arc<InMemoryRoomRegistry>) {
        let registry = Arc::new(InMemoryRoomRegistry::new());
        (BroadcastEngine::new(registry.clone()), registry)
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_member() {
        // テスト項目: room の全メンバーにペイロードが届く
        // given (前提条件):
        let (engine, registry) = create_test_engine();
        let (a, mut rx_a) = create_test_session("42", 1, 8);
        let (b, mut rx_b) = create_test_session("42", 2, 8);
        registry.join(a.clone()).await;
        registry.join(b.clone()).await;

        // when (操作):
        let report = engine.broadcast(a.room(), "frame").await;

        // then (期待する結果):
        assert_eq!(report.delivered, 2);
        assert!(report.evicted.is_empty());
        assert_eq!(rx_a.recv().await, Some("frame".to_string()));
        assert_eq!(rx_b.recv().await, Some("frame".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_evicts_closed_session_without_error() {
        // テスト項目: 切断済みの B は registry から除外され、A には届く
        // given (前提条件): room "42" に A と B、B の接続は既に閉じている
        let (engine, registry) = create_test_engine();
        let (a, mut rx_a) = create_test_session("42", 1, 8);
        let (b, rx_b) = create_test_session("42", 2, 8);
        registry.join(a.clone()).await;
        registry.join(b.clone()).await;
        drop(rx_b);

        // when (操作):
        let report = engine.broadcast(a.room(), "chat").await;

        // then (期待する結果):
        assert_eq!(report.delivered, 1);
        assert_eq!(report.evicted, vec![b.id()]);
        assert_eq!(rx_a.recv().await, Some("chat".to_string()));

        let members = registry.members_of(a.room()).await;
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id(), a.id());
        assert!(!b.is_live());
    }

    #[tokio::test]
    async fn test_broadcast_evicts_saturated_session() {
        // テスト項目: 送信キューが満杯のセッションは除外され、他のメンバーには届く
        // given (前提条件):
        let (engine, registry) = create_test_engine();
        let (slow, _rx_slow) = create_test_session("42", 1, 1);
        let (fast, mut rx_fast) = create_test_session("42", 2, 8);
        registry.join(slow.clone()).await;
        registry.join(fast.clone()).await;
        slow.deliver("backlog").unwrap();

        // when (操作):
        let report = engine.broadcast(slow.room(), "chat").await;

        // then (期待する結果):
        assert_eq!(report.evicted, vec![slow.id()]);
        assert_eq!(rx_fast.recv().await, Some("chat".to_string()));
        assert_eq!(registry.members_of(slow.room()).await.len(), 1);
    }

    #[tokio::test]
    async fn test_broadcast_is_scoped_to_room() {
        // テスト項目: 他の room のメンバーには届かない
        // given (前提条件):
        let (engine, registry) = create_test_engine();
        let (a, mut rx_a) = create_test_session("7", 1, 8);
        let (c, mut rx_c) = create_test_session("8", 3, 8);
        registry.join(a.clone()).await;
        registry.join(c.clone()).await;

        // when (操作):
        engine.broadcast(a.room(), "only-seven").await;

        // then (期待する結果):
        assert_eq!(rx_a.recv().await, Some("only-seven".to_string()));
        assert!(rx_c.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_to_empty_room() {
        // テスト項目: メンバーのいない room へのブロードキャストはエラーにならない
        // given (前提条件):
        let (engine, _registry) = create_test_engine();
        let room = RoomKey::new("ghost".to_string()).unwrap();

        // when (操作):
        let report = engine.broadcast(&room, "nobody").await;

        // then (期待する結果):
        assert_eq!(report, BroadcastReport::default());
    }
}
