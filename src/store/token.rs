use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// An access token held by the external token store, with its linked
/// refresh token when one was issued alongside it.
#[derive(Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    pub username: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub issued_at: DateTime<Utc>,
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("username", &self.username)
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

/// Read/delete access to the external token store.
///
/// This crate only ever enumerates and deletes; token issuance belongs to
/// the authorization server.
#[async_trait]
pub trait TokenStore {
    /// Whether the backend can enumerate tokens per username.
    ///
    /// Some store backends cannot; revocation is then skipped rather than
    /// failed (see [`RevocationGateway`](crate::RevocationGateway)).
    fn supports_user_lookup(&self) -> bool {
        true
    }

    async fn find_tokens_by_username(&self, username: &str)
        -> Result<Vec<IssuedToken>, AuthError>;

    /// Idempotent delete; removing an absent token is not an error.
    async fn remove_access_token(&self, token: &str) -> Result<(), AuthError>;

    /// Idempotent delete; removing an absent token is not an error.
    async fn remove_refresh_token(&self, token: &str) -> Result<(), AuthError>;
}
