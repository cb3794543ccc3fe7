//! Domain entities

use chrono::{DateTime, Utc};

use super::{
    error::ValueObjectError,
    value_object::{ImageUrl, MessageContent, MessageId, PrincipalId, Role, RoomKey},
};

/// Authenticated identity attached to a connection.
///
/// Resolved once at handshake time with its role already reduced to a
/// single label, and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: PrincipalId,
    pub name: String,
    pub role: Role,
    pub avatar: Option<String>,
}

impl Principal {
    /// Build a principal from the full set of roles it holds
    pub fn new(id: PrincipalId, name: impl Into<String>, roles: &[Role]) -> Self {
        Self {
            id,
            name: name.into(),
            role: Role::primary(roles),
            avatar: None,
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
}

/// Body of a chat message: exactly one of text or image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatBody {
    Text(MessageContent),
    Image(ImageUrl),
}

impl ChatBody {
    /// Validate the raw parts of a submission.
    ///
    /// Blank parts count as absent; exactly one part must remain.
    pub fn from_parts(
        content: Option<String>,
        image_url: Option<String>,
    ) -> Result<Self, ValueObjectError> {
        let content = content.filter(|c| !c.trim().is_empty());
        let image_url = image_url.filter(|u| !u.trim().is_empty());

        match (content, image_url) {
            (Some(content), None) => Ok(Self::Text(MessageContent::new(content)?)),
            (None, Some(url)) => Ok(Self::Image(ImageUrl::new(url)?)),
            (None, None) => Err(ValueObjectError::SubmissionEmpty),
            (Some(_), Some(_)) => Err(ValueObjectError::SubmissionAmbiguous),
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Text(content) => Some(content.as_str()),
            Self::Image(_) => None,
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::Image(url) => Some(url.as_str()),
        }
    }
}

/// A chat message that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub room: RoomKey,
    pub sender: Principal,
    pub body: ChatBody,
}

impl NewMessage {
    pub fn new(room: RoomKey, sender: Principal, body: ChatBody) -> Self {
        Self { room, sender, body }
    }
}

/// A persisted chat event; never mutated after creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub room: RoomKey,
    /// `None` is reserved for events without any sender
    pub sender_id: Option<PrincipalId>,
    pub sender_name: String,
    pub role: Role,
    pub avatar: Option<String>,
    pub body: ChatBody,
    pub created_at: DateTime<Utc>,
    /// Reserved for read receipts; not enforced by the chat core
    pub delivered: bool,
}

impl Message {
    /// Materialize a new message with the id and timestamp assigned by a store
    pub fn from_new(new: NewMessage, id: MessageId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            room: new.room,
            sender_id: Some(new.sender.id),
            sender_name: new.sender.name,
            role: new.sender.role,
            avatar: new.sender.avatar,
            body: new.body,
            created_at,
            delivered: false,
        }
    }

    pub fn content(&self) -> Option<&str> {
        self.body.content()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.body.image_url()
    }
}
