//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{OriginalUri, Path, Query, State},
    http::{HeaderMap, StatusCode},
};

use crate::{
    domain::{Principal, RoomKey},
    infrastructure::dto::{
        http::{HistoryQuery, MemberDto, RoomSummaryDto},
        websocket::{ChatFrame, ChatSubmission, HistoryFrame},
    },
    ui::state::AppState,
};

use super::credentials::handshake_request;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of live rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    let room_summaries: Vec<RoomSummaryDto> = rooms
        .into_iter()
        .map(|snapshot| RoomSummaryDto {
            room: snapshot.room.into_string(),
            members: snapshot.members.iter().map(MemberDto::from).collect(),
        })
        .collect();

    Json(room_summaries)
}

/// Get stored history of a room
pub async fn get_room_messages(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
    Query(query): Query<HistoryQuery>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Result<Json<HistoryFrame>, StatusCode> {
    authenticate(&state, uri.path(), &headers).await?;
    let room = parse_room(room)?;

    match state.get_history_usecase.execute(&room, query.limit).await {
        Ok(messages) => Ok(Json(HistoryFrame::new(&room, &messages))),
        Err(e) => {
            tracing::error!("Failed to load history of room '{}': {}", room, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Post a message into a room as a staff principal
pub async fn post_room_message(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Json(submission): Json<ChatSubmission>,
) -> Result<(StatusCode, Json<ChatFrame>), StatusCode> {
    let principal = authenticate(&state, uri.path(), &headers).await?;
    if !principal.role.is_staff() {
        tracing::warn!(
            "Principal {} ('{}') with role {} may not post through the API",
            principal.id,
            principal.name,
            principal.role
        );
        return Err(StatusCode::FORBIDDEN);
    }
    let room = parse_room(room)?;

    // Detached from the request so a dropped client cannot cut the submission short
    let usecase = state.send_message_usecase.clone();
    let posted = tokio::spawn(async move { usecase.post_as(principal, room, submission).await })
        .await
        .map_err(|e| {
            tracing::error!("API submission task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    match posted {
        Ok(message) => Ok((StatusCode::CREATED, Json(ChatFrame::from(&message)))),
        Err(e) if e.is_client_fault() => {
            tracing::warn!("Rejected API submission: {}", e);
            Err(StatusCode::UNPROCESSABLE_ENTITY)
        }
        Err(e) => {
            tracing::error!("API submission was not broadcast: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn authenticate(
    state: &AppState,
    path: &str,
    headers: &HeaderMap,
) -> Result<Principal, StatusCode> {
    let request = handshake_request(path, None, headers);
    state.authenticator.authenticate(&request).await.ok_or_else(|| {
        tracing::warn!("Unauthenticated API request to '{}'", path);
        StatusCode::UNAUTHORIZED
    })
}

fn parse_room(room: String) -> Result<RoomKey, StatusCode> {
    RoomKey::new(room).map_err(|e| {
        tracing::warn!("Invalid room key in API request: {}", e);
        StatusCode::BAD_REQUEST
    })
}
