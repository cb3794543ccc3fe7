//! UseCase: 稼働中の room 一覧取得処理

use std::sync::Arc;

use crate::domain::{Principal, RoomKey, RoomRegistry};

/// A live room and the principals currently joined to it, in join order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub room: RoomKey,
    pub members: Vec<Principal>,
}

/// room 一覧取得のユースケース
pub struct GetRoomsUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl GetRoomsUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self) -> Vec<RoomSnapshot> {
        self.registry
            .rooms()
            .await
            .into_iter()
            .map(|(room, sessions)| RoomSnapshot {
                room,
                members: sessions
                    .iter()
                    .map(|session| session.principal().clone())
                    .collect(),
            })
            .collect()
    }
}
