//! Authentication contract consumed by the chat core.
//!
//! Identity is resolved by an ordered list of strategies. Each strategy
//! either resolves a principal or has no opinion; the first resolution wins.

use std::sync::Arc;

use async_trait::async_trait;

use super::{AuthError, Principal};

/// Everything the authenticator may look at when a connection is requested
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandshakeRequest {
    /// Requested target path, e.g. `/ws/chat/42`
    pub path: String,
    /// Bearer credential (`token` query parameter or `Authorization` header)
    pub token: Option<String>,
    /// Raw `Cookie` header of the request
    pub cookie_header: Option<String>,
}

impl HandshakeRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_cookie_header(mut self, cookie_header: impl Into<String>) -> Self {
        self.cookie_header = Some(cookie_header.into());
        self
    }

    /// Value of the cookie `name`, if the request carries it
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookie_header
            .as_deref()?
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.trim_matches('"'))
            .filter(|value| !value.is_empty())
    }
}

/// One way of resolving a principal from a handshake request
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// `Ok(None)` means "no opinion": the next strategy is tried.
    async fn resolve(&self, request: &HandshakeRequest) -> Result<Option<Principal>, AuthError>;
}

/// Ordered chain of authentication strategies
pub struct Authenticator {
    strategies: Vec<Arc<dyn AuthStrategy>>,
}

impl Authenticator {
    pub fn new(strategies: Vec<Arc<dyn AuthStrategy>>) -> Self {
        Self { strategies }
    }

    /// Resolve the principal behind a request, or `None` when it is rejected.
    ///
    /// A failing strategy is logged and skipped.
    pub async fn authenticate(&self, request: &HandshakeRequest) -> Option<Principal> {
        for strategy in &self.strategies {
            match strategy.resolve(request).await {
                Ok(Some(principal)) => {
                    tracing::debug!(
                        "Principal {} resolved by '{}' strategy",
                        principal.id,
                        strategy.name()
                    );
                    return Some(principal);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Authentication strategy '{}' failed: {}", strategy.name(), e);
                }
            }
        }
        None
    }
}
