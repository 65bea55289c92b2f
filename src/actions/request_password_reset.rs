use std::sync::Arc;

use chrono::Utc;

use crate::AuthError;
use crate::config::WardenConfig;
use crate::crypto::generate_token;
use crate::events::{AccountEvent, dispatch};
use crate::mailer::{Mailer, OutgoingMail};
use crate::messages::{Messages, keys};
use crate::store::{PendingAction, PendingKind, UserStore};

/// Mints a password-reset token and mails the confirmation link.
///
/// The account stays enabled; only the pending action changes, overwriting
/// any token minted earlier. Callers are expected to have checked
/// registration via [`IsRegisteredAction`](super::IsRegisteredAction), so a
/// missing account is surfaced as [`AuthError::UserNotFound`].
pub struct RequestPasswordResetAction<S: UserStore> {
    user_store: S,
    mailer: Arc<dyn Mailer>,
    messages: Arc<dyn Messages>,
    config: WardenConfig,
}

impl<S: UserStore> RequestPasswordResetAction<S> {
    pub fn new(
        user_store: S,
        mailer: Arc<dyn Mailer>,
        messages: Arc<dyn Messages>,
        config: WardenConfig,
    ) -> Self {
        RequestPasswordResetAction {
            user_store,
            mailer,
            messages,
            config,
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "request_password_reset", skip_all, err)
    )]
    pub async fn execute(&self, email: &str, locale: &str) -> Result<(), AuthError> {
        let mut user = self
            .user_store
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        // A never-confirmed account has no password to reset; it re-registers
        // instead
        if !user.enabled {
            return Err(AuthError::UserNotFound);
        }

        log::debug!(target: "warden_auth", "resetting password for user {}", user.id);

        user.pending = Some(PendingAction::new(
            PendingKind::PasswordReset,
            generate_token(self.config.token_length),
        ));
        let user = self.user_store.save(&user).await?;
        let token = user.confirmation_token().unwrap_or_default().to_owned();

        let mail = OutgoingMail {
            to: user.email.clone(),
            from: self.config.links.email_from.clone(),
            subject: "Password reset".to_owned(),
            message: self.messages.get(keys::RESET_PASSWORD, locale),
            link: self.config.links.confirm_link(&token),
        };
        if let Err(e) = self.mailer.send(mail).await {
            log::warn!(
                target: "warden_auth",
                "msg=\"reset mail dispatch failed\", error={e}"
            );
        }

        dispatch(AccountEvent::PasswordResetRequested {
            user_id: user.id,
            email: user.email.clone(),
            at: Utc::now(),
        })
        .await;

        Ok(())
    }
}
