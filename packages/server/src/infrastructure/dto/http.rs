//! HTTP API DTOs

use serde::{Deserialize, Serialize};

use crate::domain::Role;

/// Live room with its current members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub room: String,
    pub members: Vec<MemberDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDto {
    pub sender_id: i64,
    pub sender_name: String,
    pub role: Role,
}

/// Query parameters of the history endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}
