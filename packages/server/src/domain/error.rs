//! Domain errors

use thiserror::Error;

/// Validation failures of value objects and chat submissions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("room key must not be empty")]
    RoomKeyEmpty,
    #[error("room key must be at most {0} characters")]
    RoomKeyTooLong(usize),
    #[error("room key contains a forbidden character")]
    RoomKeyInvalidCharacter,
    #[error("connection target is not of the form .../chat/{{room}}")]
    TargetPathMalformed,
    #[error("message content must not be empty")]
    ContentEmpty,
    #[error("message content must be at most {0} characters")]
    ContentTooLong(usize),
    #[error("image url must not be empty")]
    ImageUrlEmpty,
    #[error("image url must be at most {0} characters")]
    ImageUrlTooLong(usize),
    #[error("a chat submission needs content or an image url")]
    SubmissionEmpty,
    #[error("a chat submission must carry either content or an image url, not both")]
    SubmissionAmbiguous,
}

/// Failures reported by a message store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("message store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored message is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("stored message is invalid: {0}")]
    InvalidRecord(#[from] ValueObjectError),
    #[error("message store unavailable: {0}")]
    Unavailable(String),
}

/// Failures inside a single authentication strategy.
///
/// The authenticator treats these as "no opinion" and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("credential lookup failed: {0}")]
    Lookup(String),
}

/// Failure to hand a frame to one session's outbound queue
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("session connection is closed")]
    Closed,
    #[error("session outbound queue is full")]
    Saturated,
}
