#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::AuthError;
use crate::crypto::hash_token;

use super::token::{IssuedToken, TokenStore};

struct StoredToken {
    access_token_id: String,
    refresh_token_id: Option<String>,
    issued: IssuedToken,
}

/// In-memory [`TokenStore`] keyed the way a real store would be (token
/// values hashed at rest), with per-token failure injection for exercising
/// partial revocation.
#[derive(Clone)]
pub struct MockTokenStore {
    tokens: Arc<Mutex<Vec<StoredToken>>>,
    poisoned: Arc<Mutex<HashSet<String>>>,
    user_lookup: bool,
}

impl MockTokenStore {
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(Mutex::new(vec![])),
            poisoned: Arc::new(Mutex::new(HashSet::new())),
            user_lookup: true,
        }
    }

    /// A store whose backend cannot enumerate tokens per username.
    pub fn without_user_lookup() -> Self {
        Self {
            user_lookup: false,
            ..Self::new()
        }
    }

    /// Seeds an issued token pair for a username.
    pub fn issue(&self, username: &str, access_token: &str, refresh_token: Option<&str>) {
        let issued = IssuedToken {
            username: username.to_owned(),
            access_token: access_token.to_owned(),
            refresh_token: refresh_token.map(str::to_owned),
            issued_at: Utc::now(),
        };
        let mut tokens = self.tokens.lock().unwrap();
        tokens.push(StoredToken {
            access_token_id: hash_token(access_token),
            refresh_token_id: refresh_token.map(hash_token),
            issued,
        });
    }

    /// Makes every subsequent deletion of `token` fail.
    pub fn poison(&self, token: &str) {
        self.poisoned.lock().unwrap().insert(hash_token(token));
    }

    /// Remaining access tokens for a username, for assertions.
    pub fn remaining_for(&self, username: &str) -> usize {
        let tokens = self.tokens.lock().unwrap();
        tokens.iter().filter(|t| t.issued.username == username).count()
    }

    fn check_poisoned(&self, token_id: &str) -> Result<(), AuthError> {
        if self.poisoned.lock().unwrap().contains(token_id) {
            return Err(AuthError::Storage("token row is locked".to_owned()));
        }
        Ok(())
    }
}

impl Default for MockTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStore for MockTokenStore {
    fn supports_user_lookup(&self) -> bool {
        self.user_lookup
    }

    async fn find_tokens_by_username(
        &self,
        username: &str,
    ) -> Result<Vec<IssuedToken>, AuthError> {
        let tokens = self.tokens.lock().unwrap();
        Ok(tokens
            .iter()
            .filter(|t| t.issued.username == username)
            .map(|t| t.issued.clone())
            .collect())
    }

    async fn remove_access_token(&self, token: &str) -> Result<(), AuthError> {
        let token_id = hash_token(token);
        self.check_poisoned(&token_id)?;
        let mut tokens = self.tokens.lock().unwrap();
        tokens.retain(|t| t.access_token_id != token_id);
        Ok(())
    }

    async fn remove_refresh_token(&self, token: &str) -> Result<(), AuthError> {
        let token_id = hash_token(token);
        self.check_poisoned(&token_id)?;
        let mut tokens = self.tokens.lock().unwrap();
        for stored in tokens.iter_mut() {
            if stored.refresh_token_id.as_deref() == Some(token_id.as_str()) {
                stored.refresh_token_id = None;
                stored.issued.refresh_token = None;
            }
        }
        Ok(())
    }
}
