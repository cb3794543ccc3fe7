//! UseCase errors

use thiserror::Error;

use crate::domain::{StoreError, ValueObjectError};

/// Reasons a connection request is refused before any session exists
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("invalid room key: {0}")]
    InvalidRoomKey(#[from] ValueObjectError),
    #[error("no principal could be resolved for the request")]
    Rejected,
}

/// Reasons a chat submission produced no broadcast
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("submission is not valid JSON: {0}")]
    Malformed(serde_json::Error),
    #[error("submission rejected: {0}")]
    Invalid(#[from] ValueObjectError),
    #[error("failed to persist message: {0}")]
    Persistence(#[from] StoreError),
    #[error("failed to encode frame: {0}")]
    Encoding(serde_json::Error),
}

impl SubmitError {
    /// Submissions that are dropped silently rather than reported
    pub fn is_client_fault(&self) -> bool {
        matches!(self, Self::Malformed(_) | Self::Invalid(_))
    }
}
