//! Conversion logic between DTOs and domain entities.

use chrono::{DateTime, Utc};

use crate::domain::{
    ChatBody, Message, MessageId, Principal, PrincipalId, RoomKey, ValueObjectError,
};
use crate::infrastructure::dto::{
    http::MemberDto,
    record::MessageRecord,
    websocket::{ChatFrame, ChatSubmission, HistoryFrame, PresenceFrame},
};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&Message> for ChatFrame {
    fn from(message: &Message) -> Self {
        Self {
            room: message.room.as_str().to_string(),
            sender_id: message.sender_id.map(|id| id.value()),
            sender_name: message.sender_name.clone(),
            role: message.role,
            content: message.content().map(str::to_string),
            image_url: message.image_url().map(str::to_string),
            avatar: message.avatar.clone(),
            timestamp: message.created_at,
        }
    }
}

impl HistoryFrame {
    pub fn new(room: &RoomKey, messages: &[Message]) -> Self {
        Self {
            room: room.as_str().to_string(),
            messages: messages.iter().map(ChatFrame::from).collect(),
        }
    }
}

impl PresenceFrame {
    pub fn new(room: &RoomKey, principal: &Principal, timestamp: DateTime<Utc>) -> Self {
        Self {
            room: room.as_str().to_string(),
            sender_id: principal.id.value(),
            sender_name: principal.name.clone(),
            role: principal.role,
            timestamp,
        }
    }
}

impl From<&Principal> for MemberDto {
    fn from(principal: &Principal) -> Self {
        Self {
            sender_id: principal.id.value(),
            sender_name: principal.name.clone(),
            role: principal.role,
        }
    }
}

impl From<&Message> for MessageRecord {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.value(),
            room: message.room.as_str().to_string(),
            sender_id: message.sender_id.map(|id| id.value()),
            sender_name: message.sender_name.clone(),
            role: message.role,
            avatar: message.avatar.clone(),
            content: message.content().map(str::to_string),
            image_url: message.image_url().map(str::to_string),
            created_at: message.created_at,
            delivered: message.delivered,
        }
    }
}

// ========================================
// DTO → Domain Entity
// ========================================

impl TryFrom<ChatSubmission> for ChatBody {
    type Error = ValueObjectError;

    fn try_from(submission: ChatSubmission) -> Result<Self, Self::Error> {
        ChatBody::from_parts(submission.content, submission.image_url)
    }
}

impl TryFrom<MessageRecord> for Message {
    type Error = ValueObjectError;

    fn try_from(record: MessageRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MessageId::new(record.id),
            room: RoomKey::new(record.room)?,
            sender_id: record.sender_id.map(PrincipalId::new),
            sender_name: record.sender_name,
            role: record.role,
            avatar: record.avatar,
            body: ChatBody::from_parts(record.content, record.image_url)?,
            created_at: record.created_at,
            delivered: record.delivered,
        })
    }
}
