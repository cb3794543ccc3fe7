//! WebSocket wire DTOs.
//!
//! Every outbound frame is a JSON object whose `type` field selects its shape:
//!
//! | type    | fields |
//! |---------|--------|
//! | HISTORY | room, messages |
//! | CHAT    | room, senderId, senderName, role, content, imageUrl, avatar, timestamp |
//! | JOIN    | room, senderId, senderName, role, timestamp |
//! | LEAVE   | room, senderId, senderName, role, timestamp |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Role;

/// Outbound frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frame {
    History(HistoryFrame),
    Chat(ChatFrame),
    Join(PresenceFrame),
    Leave(PresenceFrame),
}

impl Frame {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Recent room history, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryFrame {
    pub room: String,
    pub messages: Vec<ChatFrame>,
}

/// One chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatFrame {
    pub room: String,
    pub sender_id: Option<i64>,
    pub sender_name: String,
    pub role: Role,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub avatar: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// A principal entering (JOIN) or leaving (LEAVE) a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceFrame {
    pub room: String,
    pub sender_id: i64,
    pub sender_name: String,
    pub role: Role,
    pub timestamp: DateTime<Utc>,
}

/// Inbound chat submission sent by a client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSubmission {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}
