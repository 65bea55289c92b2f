use std::sync::Arc;

use chrono::Utc;

use crate::AuthError;
use crate::config::WardenConfig;
use crate::crypto::{Argon2Hasher, PasswordHasher, SecretString, generate_token};
use crate::events::{AccountEvent, dispatch};
use crate::mailer::{Mailer, OutgoingMail};
use crate::messages::{Messages, keys};
use crate::store::{PendingAction, PendingKind, UserStore};
use crate::validators::validate_email;

/// Starts a two-step email change.
///
/// Returns `Ok(false)` when the account is missing, the new address already
/// belongs to a different user, or the password does not verify; none of
/// these mutate anything or send mail. On success the new address is held
/// as pending alongside a fresh token, the verification link goes to the
/// *new* address, and the current email stays usable for login until
/// [`VerifyEmailAction`](super::VerifyEmailAction) completes the change.
///
/// The in-process uniqueness check is a fast-path rejection; the store's
/// unique constraint stays authoritative when two changes race.
pub struct ChangeEmailAction<S, H = Argon2Hasher>
where
    S: UserStore,
{
    user_store: S,
    mailer: Arc<dyn Mailer>,
    messages: Arc<dyn Messages>,
    config: WardenConfig,
    hasher: H,
}

impl<S: UserStore> ChangeEmailAction<S, Argon2Hasher> {
    pub fn new(
        user_store: S,
        mailer: Arc<dyn Mailer>,
        messages: Arc<dyn Messages>,
        config: WardenConfig,
    ) -> Self {
        Self {
            user_store,
            mailer,
            messages,
            config,
            hasher: Argon2Hasher::default(),
        }
    }
}

impl<S: UserStore, H: PasswordHasher> ChangeEmailAction<S, H> {
    pub fn with_hasher(
        user_store: S,
        mailer: Arc<dyn Mailer>,
        messages: Arc<dyn Messages>,
        config: WardenConfig,
        hasher: H,
    ) -> Self {
        Self {
            user_store,
            mailer,
            messages,
            config,
            hasher,
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "change_email", skip_all, err)
    )]
    pub async fn execute(
        &self,
        identity: &str,
        password: &SecretString,
        new_email: &str,
        locale: &str,
    ) -> Result<bool, AuthError> {
        log::debug!(target: "warden_auth", "changing e-mail");
        validate_email(new_email)?;

        let mut user = match self.user_store.find_by_email(identity).await? {
            Some(user) => user,
            None => {
                log::warn!(target: "warden_auth", "msg=\"no account for e-mail change\"");
                return Ok(false);
            }
        };

        if !user.enabled {
            return Ok(false);
        }

        if let Some(other) = self.user_store.find_by_email(new_email).await? {
            if other.id != user.id {
                log::warn!(
                    target: "warden_auth",
                    "msg=\"target e-mail already in use\", user_id={}",
                    other.id
                );
                return Ok(false);
            }
        }

        if !self
            .hasher
            .verify(password.expose_secret(), &user.password_hash)?
        {
            return Ok(false);
        }

        user.pending = Some(PendingAction::new(
            PendingKind::EmailChange {
                new_email: new_email.to_owned(),
            },
            generate_token(self.config.token_length),
        ));
        let user = self.user_store.save(&user).await?;
        let token = user.confirmation_token().unwrap_or_default().to_owned();

        let mail = OutgoingMail {
            to: new_email.to_owned(),
            from: self.config.links.email_from.clone(),
            subject: "E-mail change".to_owned(),
            message: self.messages.get(keys::VERIFICATION, locale),
            link: self.config.links.verify_link(&token),
        };
        if let Err(e) = self.mailer.send(mail).await {
            log::warn!(
                target: "warden_auth",
                "msg=\"verification mail dispatch failed\", error={e}"
            );
        }

        dispatch(AccountEvent::EmailChangeRequested {
            user_id: user.id,
            new_email: new_email.to_owned(),
            at: Utc::now(),
        })
        .await;

        Ok(true)
    }
}
