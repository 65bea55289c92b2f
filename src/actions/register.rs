use std::sync::Arc;

use chrono::Utc;

use crate::AuthError;
use crate::config::WardenConfig;
use crate::crypto::generate_token;
use crate::events::{AccountEvent, dispatch};
use crate::mailer::{Mailer, OutgoingMail};
use crate::messages::{Messages, keys};
use crate::store::{NewUser, PendingAction, PendingKind, Role, User, UserStore};
use crate::validators::validate_email;

/// Starts a registration: mints a confirmation token, persists the account
/// disabled, and mails the confirmation link.
///
/// An existing record for the email is reused and overwritten, so a user
/// who never confirmed can re-register and receive a fresh token. Callers
/// are expected to reject already-confirmed accounts via
/// [`IsRegisteredAction`](super::IsRegisteredAction) first; this action
/// does not guard against them.
pub struct RegisterAction<S: UserStore> {
    user_store: S,
    mailer: Arc<dyn Mailer>,
    messages: Arc<dyn Messages>,
    config: WardenConfig,
}

impl<S: UserStore> RegisterAction<S> {
    pub fn new(
        user_store: S,
        mailer: Arc<dyn Mailer>,
        messages: Arc<dyn Messages>,
        config: WardenConfig,
    ) -> Self {
        RegisterAction {
            user_store,
            mailer,
            messages,
            config,
        }
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(name = "register", skip_all, err))]
    pub async fn execute(&self, email: &str, locale: &str) -> Result<User, AuthError> {
        log::debug!(target: "warden_auth", "registering new user");
        validate_email(email)?;

        let pending = PendingAction::new(
            PendingKind::Registration,
            generate_token(self.config.token_length),
        );
        let token = pending.token.clone();

        let user = match self.user_store.find_by_email(email).await? {
            Some(mut existing) => {
                // Disabled until confirmed via email
                existing.enabled = false;
                existing.pending = Some(pending);
                self.user_store.save(&existing).await?
            }
            None => {
                self.user_store
                    .create(NewUser {
                        email: email.to_owned(),
                        password_hash: String::new(),
                        enabled: false,
                        pending: Some(pending),
                        role: Role::User,
                    })
                    .await?
            }
        };

        // The token is durable at this point; a failed dispatch must not
        // undo it.
        let mail = OutgoingMail {
            to: user.email.clone(),
            from: self.config.links.email_from.clone(),
            subject: "Registration confirmation".to_owned(),
            message: self.messages.get(keys::REGISTRATION, locale),
            link: self.config.links.confirm_link(&token),
        };
        if let Err(e) = self.mailer.send(mail).await {
            log::warn!(
                target: "warden_auth",
                "msg=\"confirmation mail dispatch failed\", error={e}"
            );
        }

        dispatch(AccountEvent::RegistrationStarted {
            user_id: user.id,
            email: user.email.clone(),
            at: Utc::now(),
        })
        .await;

        Ok(user)
    }
}
