use chrono::Utc;

use crate::AuthError;
use crate::crypto::{Argon2Hasher, PasswordHasher, SecretString};
use crate::events::{AccountEvent, dispatch};
use crate::revocation::RevocationGateway;
use crate::store::{TokenStore, UserStore};
use crate::validators::PasswordPolicy;

/// Rotates an authenticated user's password.
///
/// Returns `Ok(false)` when the account is missing or the current password
/// does not verify; both are expected, user-triggerable outcomes and leave
/// the record untouched. On success every outstanding access/refresh token
/// for the identity is revoked (best effort), forcing re-authentication
/// everywhere.
///
/// Rejecting `new == current` is the caller's policy, not enforced here.
pub struct ChangePasswordAction<S, T, H = Argon2Hasher>
where
    S: UserStore,
    T: TokenStore,
{
    user_store: S,
    revocation: RevocationGateway<T>,
    policy: PasswordPolicy,
    hasher: H,
}

impl<S: UserStore, T: TokenStore> ChangePasswordAction<S, T, Argon2Hasher> {
    pub fn new(user_store: S, revocation: RevocationGateway<T>) -> Self {
        Self {
            user_store,
            revocation,
            policy: PasswordPolicy::default(),
            hasher: Argon2Hasher::default(),
        }
    }

    pub fn with_policy(
        user_store: S,
        revocation: RevocationGateway<T>,
        policy: PasswordPolicy,
    ) -> Self {
        Self {
            user_store,
            revocation,
            policy,
            hasher: Argon2Hasher::default(),
        }
    }
}

impl<S: UserStore, T: TokenStore, H: PasswordHasher> ChangePasswordAction<S, T, H> {
    pub fn with_hasher(
        user_store: S,
        revocation: RevocationGateway<T>,
        policy: PasswordPolicy,
        hasher: H,
    ) -> Self {
        Self {
            user_store,
            revocation,
            policy,
            hasher,
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "change_password", skip_all, err)
    )]
    pub async fn execute(
        &self,
        identity: &str,
        current_password: &SecretString,
        new_password: &SecretString,
    ) -> Result<bool, AuthError> {
        log::debug!(target: "warden_auth", "changing password");

        let mut user = match self.user_store.find_by_email(identity).await? {
            Some(user) => user,
            None => {
                log::warn!(target: "warden_auth", "msg=\"no account for password change\"");
                return Ok(false);
            }
        };

        // An unconfirmed account has no credential to rotate
        if !user.enabled {
            return Ok(false);
        }

        if !self
            .hasher
            .verify(current_password.expose_secret(), &user.password_hash)?
        {
            return Ok(false);
        }

        self.policy.validate(new_password.expose_secret())?;

        user.password_hash = self.hasher.hash(new_password.expose_secret())?;
        let user = self.user_store.save(&user).await?;

        // The credential just rotated; outstanding sessions must not keep
        // authenticating with tokens minted under the old one. Best effort
        // only, the change itself already committed.
        match self.revocation.revoke_tokens(identity).await {
            Ok(outcome) => {
                log::info!(
                    target: "warden_auth",
                    "msg=\"tokens revoked after password change\", revoked={}, failed={}",
                    outcome.revoked,
                    outcome.failed
                );
                dispatch(AccountEvent::TokensRevoked {
                    username: identity.to_owned(),
                    revoked: outcome.revoked,
                    failed: outcome.failed,
                    at: Utc::now(),
                })
                .await;
            }
            Err(e) => {
                log::warn!(
                    target: "warden_auth",
                    "msg=\"token revocation failed after password change\", error={e}"
                );
            }
        }

        dispatch(AccountEvent::PasswordChanged {
            user_id: user.id,
            at: Utc::now(),
        })
        .await;

        Ok(true)
    }
}
