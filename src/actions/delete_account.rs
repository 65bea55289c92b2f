use chrono::Utc;

use crate::AuthError;
use crate::events::{AccountEvent, dispatch};
use crate::revocation::RevocationGateway;
use crate::store::{TokenStore, UserStore};

/// Hard-deletes an account.
///
/// Outstanding tokens are revoked first as best-effort cleanup; a
/// revocation failure never blocks the deletion itself.
pub struct DeleteAccountAction<S, T>
where
    S: UserStore,
    T: TokenStore,
{
    user_store: S,
    revocation: RevocationGateway<T>,
}

impl<S: UserStore, T: TokenStore> DeleteAccountAction<S, T> {
    pub fn new(user_store: S, revocation: RevocationGateway<T>) -> Self {
        DeleteAccountAction {
            user_store,
            revocation,
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "delete_account", skip_all, err)
    )]
    pub async fn execute(&self, identity: &str) -> Result<(), AuthError> {
        let user = self
            .user_store
            .find_by_email(identity)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if let Err(e) = self.revocation.revoke_tokens(identity).await {
            log::warn!(
                target: "warden_auth",
                "msg=\"token revocation failed during account deletion\", error={e}"
            );
        }

        self.user_store.delete(user.id).await?;

        dispatch(AccountEvent::AccountDeleted {
            user_id: user.id,
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "warden_auth",
            "msg=\"account deleted\", user_id={}",
            user.id
        );

        Ok(())
    }
}
