//! Value objects
//!
//! 生成時にバリデーションを行い、不正な値を持つインスタンスが存在しないことを保証します。

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// Maximum length of a room key, in characters
pub const ROOM_KEY_MAX_LEN: usize = 128;
/// Maximum length of a chat message body, in characters
pub const MESSAGE_CONTENT_MAX_LEN: usize = 2000;
/// Maximum length of an image URL, in characters
pub const IMAGE_URL_MAX_LEN: usize = 500;

/// Path segment that must precede the room key in a connection target.
const CHAT_SEGMENT: &str = "chat";

// ========================================
// RoomKey
// ========================================

/// Opaque key of a chat room (e.g. an order or support-ticket identifier).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomKey(String);

impl RoomKey {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::RoomKeyEmpty);
        }
        if value.chars().count() > ROOM_KEY_MAX_LEN {
            return Err(ValueObjectError::RoomKeyTooLong(ROOM_KEY_MAX_LEN));
        }
        if value.chars().any(|c| c == '/' || c.is_control() || c.is_whitespace()) {
            return Err(ValueObjectError::RoomKeyInvalidCharacter);
        }
        Ok(Self(value))
    }

    /// Extract the room key from a connection target of the form `.../chat/{room}`.
    ///
    /// The trailing path segment is the key; an empty trailing segment, or a
    /// path whose second-to-last segment is not `chat`, is rejected.
    pub fn from_target_path(path: &str) -> Result<Self, ValueObjectError> {
        let (prefix, room) = path
            .rsplit_once('/')
            .ok_or(ValueObjectError::TargetPathMalformed)?;
        let parent = prefix.rsplit('/').next().unwrap_or_default();
        if parent != CHAT_SEGMENT {
            return Err(ValueObjectError::TargetPathMalformed);
        }
        Self::new(room.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomKey {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoomKey> for String {
    fn from(key: RoomKey) -> Self {
        key.0
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ========================================
// Identifiers
// ========================================

/// Numeric identifier of an authenticated principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(i64);

impl PrincipalId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier assigned to a message by the message store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(i64);

impl MessageId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Identifier of one live connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ========================================
// Role
// ========================================

/// Role label attached to a principal.
///
/// Variants are declared in ascending priority so that `Ord` picks the
/// canonical label when a principal holds several roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Manager,
    Admin,
}

impl Role {
    /// Reduce a role set to a single label: ADMIN > MANAGER > USER.
    ///
    /// An empty set resolves to `User`.
    pub fn primary<'a>(roles: impl IntoIterator<Item = &'a Role>) -> Role {
        roles.into_iter().copied().max().unwrap_or(Role::User)
    }

    /// Whether the role may post into rooms on behalf of the shop
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Manager => "MANAGER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ========================================
// Message body parts
// ========================================

/// Text content of a chat message (trimmed, non-empty, bounded)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::ContentEmpty);
        }
        if trimmed.chars().count() > MESSAGE_CONTENT_MAX_LEN {
            return Err(ValueObjectError::ContentTooLong(MESSAGE_CONTENT_MAX_LEN));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MessageContent> for String {
    fn from(content: MessageContent) -> Self {
        content.0
    }
}

/// URL of an image attached to a chat message (trimmed, non-empty, bounded)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageUrl(String);

impl ImageUrl {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::ImageUrlEmpty);
        }
        if trimmed.chars().count() > IMAGE_URL_MAX_LEN {
            return Err(ValueObjectError::ImageUrlTooLong(IMAGE_URL_MAX_LEN));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ImageUrl {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ImageUrl> for String {
    fn from(url: ImageUrl) -> Self {
        url.0
    }
}
