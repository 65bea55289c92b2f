//! Best-effort revocation of issued access/refresh tokens.
//!
//! Invoked by the password-change action so a credential change invalidates
//! every outstanding session. Revocation is defense-in-depth hardening, not
//! the primary security boundary: a backend that cannot enumerate tokens is
//! skipped, per-token deletion failures are counted and logged, and the
//! triggering operation never fails because of any of it.

use crate::AuthError;
use crate::store::TokenStore;

/// Result of one revocation sweep.
///
/// A token counts as revoked only when its access token and any linked
/// refresh token were both deleted; otherwise it counts as failed. There is
/// no atomicity across the set, so a crash mid-sweep leaves a partial
/// result the next sweep picks up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevocationOutcome {
    pub revoked: usize,
    pub failed: usize,
}

impl RevocationOutcome {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

pub struct RevocationGateway<T: TokenStore> {
    token_store: T,
}

impl<T: TokenStore> RevocationGateway<T> {
    pub fn new(token_store: T) -> Self {
        RevocationGateway { token_store }
    }

    /// Deletes every access and refresh token bound to `username`.
    ///
    /// Deletion is attempted independently per token; one failure does not
    /// stop the sweep. Returns an empty outcome when the backend does not
    /// support per-user lookup.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "revoke_tokens", skip(self), err)
    )]
    pub async fn revoke_tokens(&self, username: &str) -> Result<RevocationOutcome, AuthError> {
        log::debug!(target: "warden_auth", "revoking tokens for {username}");

        if !self.token_store.supports_user_lookup() {
            log::debug!(
                target: "warden_auth",
                "token store does not support per-user lookup, skipping revocation"
            );
            return Ok(RevocationOutcome::default());
        }

        let tokens = self.token_store.find_tokens_by_username(username).await?;

        let mut outcome = RevocationOutcome::default();
        for issued in &tokens {
            let mut clean = true;

            if let Err(e) = self
                .token_store
                .remove_access_token(&issued.access_token)
                .await
            {
                log::warn!(
                    target: "warden_auth",
                    "msg=\"access token removal failed\", username={username}, error={e}"
                );
                clean = false;
            }

            if let Some(refresh) = &issued.refresh_token {
                if let Err(e) = self.token_store.remove_refresh_token(refresh).await {
                    log::warn!(
                        target: "warden_auth",
                        "msg=\"refresh token removal failed\", username={username}, error={e}"
                    );
                    clean = false;
                }
            }

            if clean {
                outcome.revoked += 1;
            } else {
                outcome.failed += 1;
            }
        }

        log::debug!(
            target: "warden_auth",
            "revocation sweep for {username}: {} revoked, {} failed",
            outcome.revoked,
            outcome.failed
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockTokenStore;

    #[tokio::test]
    async fn test_revokes_all_tokens_for_user() {
        let store = MockTokenStore::new();
        store.issue("alice@example.com", "at-1", Some("rt-1"));
        store.issue("alice@example.com", "at-2", None);
        store.issue("bob@example.com", "at-3", None);

        let gateway = RevocationGateway::new(store.clone());
        let outcome = gateway.revoke_tokens("alice@example.com").await.unwrap();

        assert_eq!(outcome, RevocationOutcome { revoked: 2, failed: 0 });
        assert_eq!(store.remaining_for("alice@example.com"), 0);
        // Other users' tokens are untouched
        assert_eq!(store.remaining_for("bob@example.com"), 1);
    }

    #[tokio::test]
    async fn test_partial_failure_continues_sweep() {
        let store = MockTokenStore::new();
        store.issue("alice@example.com", "at-1", None);
        store.issue("alice@example.com", "at-2", None);
        store.issue("alice@example.com", "at-3", None);
        store.poison("at-2");

        let gateway = RevocationGateway::new(store.clone());
        let outcome = gateway.revoke_tokens("alice@example.com").await.unwrap();

        assert_eq!(outcome, RevocationOutcome { revoked: 2, failed: 1 });
        assert!(!outcome.is_clean());
        assert_eq!(store.remaining_for("alice@example.com"), 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_marks_token_failed() {
        let store = MockTokenStore::new();
        store.issue("alice@example.com", "at-1", Some("rt-1"));
        store.poison("rt-1");

        let gateway = RevocationGateway::new(store.clone());
        let outcome = gateway.revoke_tokens("alice@example.com").await.unwrap();

        assert_eq!(outcome, RevocationOutcome { revoked: 0, failed: 1 });
    }

    #[tokio::test]
    async fn test_unsupported_backend_is_a_noop() {
        let store = MockTokenStore::without_user_lookup();
        store.issue("alice@example.com", "at-1", None);

        let gateway = RevocationGateway::new(store.clone());
        let outcome = gateway.revoke_tokens("alice@example.com").await.unwrap();

        assert_eq!(outcome, RevocationOutcome::default());
        assert_eq!(store.remaining_for("alice@example.com"), 1);
    }

    #[tokio::test]
    async fn test_no_tokens_yields_empty_outcome() {
        let gateway = RevocationGateway::new(MockTokenStore::new());
        let outcome = gateway.revoke_tokens("nobody@example.com").await.unwrap();
        assert_eq!(outcome, RevocationOutcome::default());
    }
}
