//! Message-catalog lookup for notification bodies.
//!
//! Catalog contents and localization live outside this crate; actions ask
//! for a body by key and locale and embed whatever comes back.
//! [`DefaultMessages`] ships English fallbacks so the crate works without
//! wiring a catalog.

/// Catalog keys used by the lifecycle actions.
pub mod keys {
    pub const REGISTRATION: &str = "email.registration";
    pub const RESET_PASSWORD: &str = "email.resetPassword";
    pub const VERIFICATION: &str = "email.verification";
}

/// Message-catalog lookup by key and locale.
pub trait Messages: Send + Sync {
    fn get(&self, key: &str, locale: &str) -> String;
}

/// English-only catalog covering the keys this crate uses.
///
/// Unknown keys echo back the key itself, which keeps a missing catalog
/// entry visible instead of silently sending an empty body.
#[derive(Debug, Clone, Default)]
pub struct DefaultMessages;

impl Messages for DefaultMessages {
    fn get(&self, key: &str, _locale: &str) -> String {
        match key {
            keys::REGISTRATION => {
                "Thank you for registering. Please follow the link below to confirm \
                 your account and choose a password."
            }
            keys::RESET_PASSWORD => {
                "A password reset was requested for your account. Follow the link \
                 below to choose a new password. If you did not request this, you \
                 can ignore this message."
            }
            keys::VERIFICATION => {
                "Please follow the link below to verify this address as the new \
                 email for your account."
            }
            other => other,
        }
        .to_owned()
    }
}
