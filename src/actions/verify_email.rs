use chrono::Utc;

use crate::AuthError;
use crate::config::TokenConfig;
use crate::events::{AccountEvent, dispatch};
use crate::store::{PendingKind, User, UserStore};

/// Completes an email change by consuming its verification token.
///
/// Returns `Ok(None)` when no user holds the token or the token was minted
/// for a different flow, leaving user-facing messaging to the caller. On
/// success the pending address becomes the login email and the pending
/// action is cleared in the same write.
///
/// Outstanding session tokens keyed by the old email are *not* revoked
/// here; the address is not treated as a session-relevant credential.
pub struct VerifyEmailAction<S: UserStore> {
    user_store: S,
    tokens: TokenConfig,
}

impl<S: UserStore> VerifyEmailAction<S> {
    pub fn new(user_store: S, tokens: TokenConfig) -> Self {
        VerifyEmailAction { user_store, tokens }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "verify_email", skip_all, err)
    )]
    pub async fn execute(&self, token: &str) -> Result<Option<User>, AuthError> {
        let user = self.user_store.find_by_confirmation_token(token).await?;

        let mut user = match user {
            Some(user) => user,
            None => {
                log::debug!(target: "warden_auth", "no user found for verification token");
                return Ok(None);
            }
        };

        let pending = match user.pending.clone() {
            Some(pending) => pending,
            None => return Ok(None),
        };

        let new_email = match pending.kind {
            PendingKind::EmailChange { ref new_email } => new_email.clone(),
            _ => {
                log::debug!(
                    target: "warden_auth",
                    "token presented to e-mail verification belongs to another flow"
                );
                return Ok(None);
            }
        };

        if pending.is_expired(self.tokens.window_for(&pending.kind)) {
            user.pending = None;
            self.user_store.save(&user).await?;
            return Err(AuthError::TokenExpired);
        }

        log::debug!(target: "warden_auth", "verifying e-mail for user {}", user.id);

        // The store's unique constraint has the last word if the address
        // was claimed since the change was requested.
        user.email = new_email;
        user.pending = None;
        let user = self.user_store.save(&user).await?;

        dispatch(AccountEvent::EmailVerified {
            user_id: user.id,
            email: user.email.clone(),
            at: Utc::now(),
        })
        .await;

        Ok(Some(user))
    }
}
