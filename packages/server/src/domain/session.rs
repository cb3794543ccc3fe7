//! Session: one live connection bound to a room and a principal.
//!
//! ## 状態遷移
//!
//! ```text
//! HANDSHAKING ──join──▶ JOINED ──close──▶ CLOSED
//! ```
//!
//! A session whose handshake fails is never constructed. The liveness flag
//! is independent of the state: the broadcast engine clears it when delivery
//! fails, and the owning connection task reacts by running the close path.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use tokio::sync::{Notify, mpsc, mpsc::error::TrySendError};

use super::{
    entity::Principal,
    error::DeliveryError,
    value_object::{RoomKey, SessionId},
};

/// Outbound queue of serialized frames for one session
pub type PusherChannel = mpsc::Sender<String>;

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Handshaking,
    Joined,
    Closed,
}

impl SessionState {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Handshaking => 0,
            Self::Joined => 1,
            Self::Closed => 2,
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Handshaking,
            1 => Self::Joined,
            _ => Self::Closed,
        }
    }
}

pub struct Session {
    id: SessionId,
    room: RoomKey,
    principal: Principal,
    sender: PusherChannel,
    state: AtomicU8,
    live: AtomicBool,
    evicted: Notify,
}

impl Session {
    /// Create a session in the `Handshaking` state
    pub fn new(room: RoomKey, principal: Principal, sender: PusherChannel) -> Self {
        Self {
            id: SessionId::generate(),
            room,
            principal,
            sender,
            state: AtomicU8::new(SessionState::Handshaking.as_u8()),
            live: AtomicBool::new(true),
            evicted: Notify::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn room(&self) -> &RoomKey {
        &self.room
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// `Handshaking → Joined`. Returns `false` if the session was not handshaking.
    pub fn mark_joined(&self) -> bool {
        self.state
            .compare_exchange(
                SessionState::Handshaking.as_u8(),
                SessionState::Joined.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Transition to `Closed`. Returns `false` if the session was already closed.
    pub fn mark_closed(&self) -> bool {
        self.state.swap(SessionState::Closed.as_u8(), Ordering::AcqRel)
            != SessionState::Closed.as_u8()
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Clear the liveness flag and wake the connection task waiting in [`Session::evicted`].
    pub fn evict(&self) {
        if self.live.swap(false, Ordering::AcqRel) {
            self.evicted.notify_one();
        }
    }

    /// Resolves once the session has been evicted.
    pub async fn evicted(&self) {
        let notified = self.evicted.notified();
        if !self.is_live() {
            return;
        }
        notified.await;
    }

    /// Queue a serialized frame without waiting.
    ///
    /// A closed connection or a full queue is reported as a delivery failure.
    pub fn deliver(&self, payload: &str) -> Result<(), DeliveryError> {
        self.sender
            .try_send(payload.to_string())
            .map_err(|e| match e {
                TrySendError::Full(_) => DeliveryError::Saturated,
                TrySendError::Closed(_) => DeliveryError::Closed,
            })
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("room", &self.room)
            .field("principal", &self.principal)
            .field("state", &self.state())
            .field("live", &self.is_live())
            .finish()
    }
}
