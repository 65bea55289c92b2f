use chrono::Utc;

use crate::AuthError;
use crate::config::TokenConfig;
use crate::crypto::{Argon2Hasher, PasswordHasher, SecretString};
use crate::events::{AccountEvent, dispatch};
use crate::store::{PendingKind, User, UserStore};
use crate::validators::PasswordPolicy;

/// Consumes a confirmation token and sets the account's password.
///
/// Completes both the registration flow and the password-reset flow: each
/// mints a token whose consumption means "prove control of the mailbox,
/// then choose a password". Email-change tokens are rejected here; they
/// belong to [`VerifyEmailAction`](super::VerifyEmailAction).
///
/// The pending action is cleared in the same write that stores the new
/// password, so a token can never be consumed twice. No notification is
/// sent.
pub struct ConfirmRegistrationAction<S, H = Argon2Hasher>
where
    S: UserStore,
{
    user_store: S,
    policy: PasswordPolicy,
    hasher: H,
    tokens: TokenConfig,
}

impl<S: UserStore> ConfirmRegistrationAction<S, Argon2Hasher> {
    pub fn new(user_store: S, tokens: TokenConfig) -> Self {
        Self {
            user_store,
            policy: PasswordPolicy::default(),
            hasher: Argon2Hasher::default(),
            tokens,
        }
    }

    pub fn with_policy(user_store: S, tokens: TokenConfig, policy: PasswordPolicy) -> Self {
        Self {
            user_store,
            policy,
            hasher: Argon2Hasher::default(),
            tokens,
        }
    }
}

impl<S: UserStore, H: PasswordHasher> ConfirmRegistrationAction<S, H> {
    pub fn with_hasher(
        user_store: S,
        tokens: TokenConfig,
        policy: PasswordPolicy,
        hasher: H,
    ) -> Self {
        Self {
            user_store,
            policy,
            hasher,
            tokens,
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "confirm_registration", skip_all, err)
    )]
    pub async fn execute(
        &self,
        token: &str,
        new_password: &SecretString,
    ) -> Result<User, AuthError> {
        let user = self.user_store.find_by_confirmation_token(token).await?;

        let mut user = match user {
            Some(user) => user,
            None => return Err(AuthError::TokenInvalid),
        };

        let pending = match user.pending.clone() {
            Some(pending) => pending,
            None => return Err(AuthError::TokenInvalid),
        };

        match pending.kind {
            PendingKind::Registration | PendingKind::PasswordReset => {}
            PendingKind::EmailChange { .. } => {
                log::debug!(
                    target: "warden_auth",
                    "email-change token presented to password confirmation"
                );
                return Err(AuthError::TokenInvalid);
            }
        }

        if pending.is_expired(self.tokens.window_for(&pending.kind)) {
            user.pending = None;
            self.user_store.save(&user).await?;
            return Err(AuthError::TokenExpired);
        }

        self.policy.validate(new_password.expose_secret())?;

        user.password_hash = self.hasher.hash(new_password.expose_secret())?;
        user.enabled = true;
        user.pending = None;
        let user = self.user_store.save(&user).await?;

        dispatch(AccountEvent::RegistrationConfirmed {
            user_id: user.id,
            at: Utc::now(),
        })
        .await;

        Ok(user)
    }
}
