//! Server-side session strategy

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{AuthError, AuthStrategy, HandshakeRequest, Principal};

use super::PrincipalDirectory;

/// Cookie carrying the server-side session identifier
pub const SESSION_COOKIE: &str = "BANTER_SESSION";

/// Resolves the principal of an already-established server-side session
pub struct SessionCookieStrategy {
    directory: Arc<PrincipalDirectory>,
}

impl SessionCookieStrategy {
    pub fn new(directory: Arc<PrincipalDirectory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl AuthStrategy for SessionCookieStrategy {
    fn name(&self) -> &'static str {
        "session"
    }

    async fn resolve(&self, request: &HandshakeRequest) -> Result<Option<Principal>, AuthError> {
        let Some(session_id) = request.cookie(SESSION_COOKIE) else {
            return Ok(None);
        };
        Ok(self.directory.by_session(session_id))
    }
}
