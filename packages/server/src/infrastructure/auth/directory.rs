//! Principal directory
//!
//! Known principals with the credentials that resolve to them. Roles are
//! reduced to a single label when the directory is built, so every
//! [`Principal`] handed out is already fully materialized.
//!
//! ```json
//! {
//!   "principals": [
//!     { "id": 1, "name": "alice", "roles": ["USER"], "tokens": ["alice-token"] },
//!     { "id": 2, "name": "shop", "roles": ["USER", "ADMIN"], "sessions": ["s-1"] }
//!   ]
//! }
//! ```

use std::{collections::HashMap, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{Principal, PrincipalId, Role};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read principals file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse principals file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One principal as described in the principals file
#[derive(Debug, Clone, Deserialize)]
pub struct PrincipalEntry {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub tokens: Vec<String>,
    #[serde(default)]
    pub sessions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PrincipalsFile {
    principals: Vec<PrincipalEntry>,
}

#[derive(Default)]
pub struct PrincipalDirectory {
    tokens: HashMap<String, Principal>,
    /// Server-side session ids issued outside this process
    sessions: HashMap<String, Principal>,
}

impl PrincipalDirectory {
    pub fn new(entries: Vec<PrincipalEntry>) -> Self {
        let mut tokens = HashMap::new();
        let mut sessions = HashMap::new();

        for entry in entries {
            let mut principal = Principal::new(PrincipalId::new(entry.id), entry.name, &entry.roles);
            principal.avatar = entry.avatar;

            for token in entry.tokens {
                tokens.insert(token, principal.clone());
            }
            for session in entry.sessions {
                sessions.insert(session, principal.clone());
            }
        }

        Self { tokens, sessions }
    }

    pub fn from_json(json: &str) -> Result<Self, DirectoryError> {
        let file: PrincipalsFile = serde_json::from_str(json)?;
        Ok(Self::new(file.principals))
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    pub fn by_token(&self, token: &str) -> Option<Principal> {
        self.tokens.get(token).cloned()
    }

    pub fn by_session(&self, session_id: &str) -> Option<Principal> {
        self.sessions.get(session_id).cloned()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRINCIPALS_JSON: &str = r#"{
        "principals": [
            { "id": 1, "name": "alice", "roles": ["USER"], "tokens": ["alice-token"] },
            {
                "id": 2,
                "name": "shop",
                "roles": ["USER", "ADMIN", "MANAGER"],
                "avatar": "https://cdn.example.com/shop.png",
                "tokens": ["shop-token"],
                "sessions": ["shop-session"]
            },
            { "id": 3, "name": "guest" }
        ]
    }"#;

    #[test]
    fn test_from_json_materializes_principals() {
        // テスト項目: JSON から Principal が構築され、ロールが 1 つに決まる
        // given (前提条件):
        let directory = PrincipalDirectory::from_json(PRINCIPALS_JSON).unwrap();

        // when (操作):
        let alice = directory.by_token("alice-token").unwrap();
        let shop = directory.by_session("shop-session").unwrap();

        // then (期待する結果):
        assert_eq!(alice.id, PrincipalId::new(1));
        assert_eq!(alice.role, Role::User);
        assert_eq!(shop.role, Role::Admin);
        assert_eq!(shop.avatar.as_deref(), Some("https://cdn.example.com/shop.png"));
        assert_eq!(directory.token_count(), 2);
    }

    #[test]
    fn test_unknown_credentials_resolve_to_none() {
        // テスト項目: 未知のトークン・セッションは None
        // given (前提条件):
        let directory = PrincipalDirectory::from_json(PRINCIPALS_JSON).unwrap();

        // when (操作) / then (期待する結果):
        assert!(directory.by_token("nope").is_none());
        assert!(directory.by_session("nope").is_none());
    }

    #[test]
    fn test_from_json_rejects_malformed_document() {
        // テスト項目: 不正な JSON はエラーになる
        // given (前提条件):
        let json = r#"{ "principals": [ { "name": "no id" } ] }"#;

        // when (操作):
        let result = PrincipalDirectory::from_json(json);

        // then (期待する結果):
        assert!(matches!(result, Err(DirectoryError::Parse(_))));
    }
}
