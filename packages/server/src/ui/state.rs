//! Server state shared by every handler.

use std::sync::Arc;

use crate::{
    domain::Authenticator,
    usecase::{
        ConnectSessionUseCase, DisconnectSessionUseCase, GetHistoryUseCase, GetRoomsUseCase,
        SendMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// ConnectSessionUseCase（セッション接続のユースケース）
    pub connect_session_usecase: Arc<ConnectSessionUseCase>,
    /// DisconnectSessionUseCase（セッション切断のユースケース）
    pub disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// GetHistoryUseCase（履歴取得のユースケース）
    pub get_history_usecase: Arc<GetHistoryUseCase>,
    /// GetRoomsUseCase（room 一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// HTTP API の呼び出し元の認証に使用
    pub authenticator: Arc<Authenticator>,
}
