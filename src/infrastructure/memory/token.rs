//! In-memory implementation of token repository.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::repositories::{ApiToken, TokenRepository};
use crate::error::AppError;

/// API tokens keyed by id. Only hashes are stored.
pub struct MemoryTokenRepository {
    tokens: DashMap<i64, ApiToken>,
    next_id: AtomicI64,
}

impl MemoryTokenRepository {
    pub fn new() -> Self {
        Self {
            tokens: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    fn find_by_hash(&self, token_hash: &str) -> Option<ApiToken> {
        self.tokens
            .iter()
            .find(|e| e.token_hash == token_hash)
            .map(|e| e.value().clone())
    }
}

impl Default for MemoryTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenRepository for MemoryTokenRepository {
    async fn validate_token(&self, token_hash: &str) -> Result<bool, AppError> {
        Ok(self
            .find_by_hash(token_hash)
            .is_some_and(|token| !token.is_revoked()))
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        if let Some(mut entry) = self
            .tokens
            .iter_mut()
            .find(|e| e.token_hash == token_hash && !e.is_revoked())
        {
            entry.last_used_at = Some(Utc::now());
        }

        Ok(())
    }

    async fn create_token(&self, name: &str, token_hash: &str) -> Result<ApiToken, AppError> {
        if self.find_by_hash(token_hash).is_some() {
            return Err(AppError::conflict(
                "Token already exists",
                json!({ "name": name }),
            ));
        }

        let token = ApiToken {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: name.to_string(),
            token_hash: token_hash.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        };
        self.tokens.insert(token.id, token.clone());

        Ok(token)
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        let mut tokens: Vec<ApiToken> = self.tokens.iter().map(|e| e.value().clone()).collect();
        tokens.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(tokens)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, AppError> {
        Ok(self.tokens.get(&id).map(|e| e.value().clone()))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        Ok(self
            .tokens
            .iter()
            .filter(|e| e.name == name)
            .map(|e| e.value().clone())
            .min_by_key(|token| token.id))
    }

    async fn revoke_token(&self, id: i64) -> Result<(), AppError> {
        let Some(mut token) = self.tokens.get_mut(&id) else {
            return Err(AppError::not_found("Token not found", json!({ "id": id })));
        };

        if token.revoked_at.is_none() {
            token.revoked_at = Some(Utc::now());
        }

        Ok(())
    }
}
