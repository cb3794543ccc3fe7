//! Bearer token strategy

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{AuthError, AuthStrategy, HandshakeRequest, Principal};

use super::PrincipalDirectory;

/// Resolves the bearer credential carried by the request
pub struct QueryTokenStrategy {
    directory: Arc<PrincipalDirectory>,
}

impl QueryTokenStrategy {
    pub fn new(directory: Arc<PrincipalDirectory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl AuthStrategy for QueryTokenStrategy {
    fn name(&self) -> &'static str {
        "token"
    }

    async fn resolve(&self, request: &HandshakeRequest) -> Result<Option<Principal>, AuthError> {
        let Some(token) = request.token.as_deref().filter(|t| !t.is_empty()) else {
            return Ok(None);
        };
        Ok(self.directory.by_token(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{PrincipalId, Role},
        infrastructure::auth::PrincipalEntry,
    };

    fn create_test_strategy() -> QueryTokenStrategy {
        let directory = PrincipalDirectory::new(vec![PrincipalEntry {
            id: 1,
            name: "alice".to_string(),
            roles: vec![Role::User],
            avatar: None,
            tokens: vec!["alice-token".to_string()],
            sessions: vec![],
        }]);
        QueryTokenStrategy::new(Arc::new(directory))
    }

    #[tokio::test]
    async fn test_resolves_known_token() {
        // テスト項目: 既知のトークンから Principal が解決される
        // given (前提条件):
        let strategy = create_test_strategy();
        let request = HandshakeRequest::new("/ws/chat/1").with_token("alice-token");

        // when (操作):
        let result = strategy.resolve(&request).await.unwrap();

        // then (期待する結果):
        assert_eq!(result.map(|p| p.id), Some(PrincipalId::new(1)));
    }

    #[tokio::test]
    async fn test_no_opinion_without_token() {
        // テスト項目: トークンが無い・空・未知の場合は意見なし（None）
        // given (前提条件):
        let strategy = create_test_strategy();
        let requests = [
            HandshakeRequest::new("/ws/chat/1"),
            HandshakeRequest::new("/ws/chat/1").with_token(""),
            HandshakeRequest::new("/ws/chat/1").with_token("bogus"),
        ];

        // when (操作) / then (期待する結果):
        for request in requests {
            assert_eq!(strategy.resolve(&request).await, Ok(None));
        }
    }
}
