//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        OriginalUri, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{Stream, StreamExt},
};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{Principal, RoomKey, Session},
    ui::state::AppState,
    usecase::{Connection, HandshakeError},
};

use super::credentials::handshake_request;

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    let request = handshake_request(uri.path(), query.token, &headers);

    // 認証と room key の検証はアップグレード前に行い、失敗時は何も登録しない
    let (room, principal) = match state.connect_session_usecase.authorize(&request).await {
        Ok(authorized) => authorized,
        Err(HandshakeError::InvalidRoomKey(e)) => {
            tracing::warn!("Refusing connection to '{}': {}", uri.path(), e);
            return Err(StatusCode::BAD_REQUEST);
        }
        Err(HandshakeError::Rejected) => {
            tracing::warn!("Refusing unauthenticated connection to '{}'", uri.path());
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    tracing::info!(
        "Handshake accepted for principal {} ('{}') in room '{}'",
        principal.id,
        principal.name,
        room
    );
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, room, principal)))
}

/// Spawns the writer task of one session.
///
/// Frames queued by the broadcast engine are written to the socket in order.
/// The task ends when the socket rejects a write.
fn pusher_loop(
    mut rx: mpsc::Receiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Spawns the reader task of one session: every text frame is a chat submission.
///
/// The task stops once the session is evicted, but only between frames: a
/// submission that is already being handled always runs to completion.
fn receive_loop<S>(
    mut receiver: S,
    state: Arc<AppState>,
    session: Arc<Session>,
) -> tokio::task::JoinHandle<()>
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let next = tokio::select! {
                next = receiver.next() => next,
                _ = session.evicted() => {
                    tracing::info!("Session {} was evicted, closing connection", session.id());
                    break;
                }
            };
            let Some(msg) = next else {
                break;
            };
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on session {}: {}", session.id(), e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    match state
                        .send_message_usecase
                        .execute(&session, text.as_str())
                        .await
                    {
                        Ok(_) => {}
                        Err(e) if e.is_client_fault() => {
                            tracing::warn!(
                                "Dropped submission from session {}: {}",
                                session.id(),
                                e
                            );
                        }
                        Err(e) => {
                            tracing::error!(
                                "Submission from session {} was not broadcast: {}",
                                session.id(),
                                e
                            );
                        }
                    }
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                }
                Message::Close(_) => {
                    tracing::info!("Session {} requested close", session.id());
                    break;
                }
                _ => {}
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    room: RoomKey,
    principal: Principal,
) {
    let Connection { session, outbound } =
        state.connect_session_usecase.join(room, principal).await;
    let (mut sender, receiver) = socket.split();

    // HISTORY はキューを経由せずソケットへ直接書き込み、JOIN より必ず先に届ける
    let history = state.connect_session_usecase.history_frame(&session).await;
    let delivered = match history.to_json() {
        Ok(json) => match sender.send(Message::Text(json.into())).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to send HISTORY to session {}: {}", session.id(), e);
                false
            }
        },
        Err(e) => {
            tracing::error!("Failed to encode HISTORY for session {}: {}", session.id(), e);
            false
        }
    };
    if !delivered {
        state.disconnect_session_usecase.abandon(&session).await;
        return;
    }

    state.connect_session_usecase.announce_join(&session).await;

    let mut send_task = pusher_loop(outbound, sender);
    let mut recv_task = receive_loop(receiver, state.clone(), session.clone());

    // The reader must not be aborted: a submission may sit between persist and broadcast
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => {
            session.evict();
            if let Err(e) = recv_task.await {
                tracing::error!("Reader of session {} failed: {}", session.id(), e);
            }
        }
    };

    state.disconnect_session_usecase.execute(&session).await;
}
