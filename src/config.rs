//! Configuration for token lifetimes, token length, and outbound links.
//!
//! ```rust
//! use warden::config::{WardenConfig, LinkConfig};
//! use chrono::Duration;
//!
//! let config = WardenConfig {
//!     links: LinkConfig {
//!         redirection_url: "https://accounts.example.com".to_owned(),
//!         email_from: "no-reply@example.com".to_owned(),
//!     },
//!     ..Default::default()
//! };
//! assert_eq!(config.tokens.password_reset_expiry, Duration::hours(1));
//! ```

use chrono::Duration;

use crate::store::PendingKind;

/// Top-level configuration.
#[derive(Debug, Clone)]
pub struct WardenConfig {
    /// Expiry windows per confirmation flow.
    pub tokens: TokenConfig,

    /// Length of generated confirmation tokens, in characters.
    ///
    /// Default is 36 (the length of the random identifiers the original
    /// confirmation links carried).
    pub token_length: usize,

    /// Where confirmation links point and who mail comes from.
    pub links: LinkConfig,
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            tokens: TokenConfig::default(),
            token_length: crate::crypto::DEFAULT_TOKEN_LENGTH,
            links: LinkConfig::default(),
        }
    }
}

impl WardenConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorter lockouts, longer windows; suitable for development.
    pub fn development() -> Self {
        Self {
            tokens: TokenConfig {
                registration_confirmation_expiry: Duration::days(7),
                password_reset_expiry: Duration::hours(2),
                email_change_expiry: Duration::days(7),
            },
            ..Self::default()
        }
    }

    /// Tighter windows for security-sensitive deployments.
    pub fn strict() -> Self {
        Self {
            tokens: TokenConfig {
                registration_confirmation_expiry: Duration::hours(12),
                password_reset_expiry: Duration::minutes(30),
                email_change_expiry: Duration::hours(12),
            },
            token_length: 48,
            ..Self::default()
        }
    }
}

/// How long a minted confirmation token stays consumable, per flow.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Default: 24 hours
    pub registration_confirmation_expiry: Duration,

    /// Default: 1 hour
    pub password_reset_expiry: Duration,

    /// Default: 24 hours
    pub email_change_expiry: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            registration_confirmation_expiry: Duration::hours(24),
            password_reset_expiry: Duration::hours(1),
            email_change_expiry: Duration::hours(24),
        }
    }
}

impl TokenConfig {
    /// The expiry window applying to a pending action of the given kind.
    pub fn window_for(&self, kind: &PendingKind) -> Duration {
        match kind {
            PendingKind::Registration => self.registration_confirmation_expiry,
            PendingKind::PasswordReset => self.password_reset_expiry,
            PendingKind::EmailChange { .. } => self.email_change_expiry,
        }
    }
}

/// Base URL for confirmation links and the sender address on outbound mail.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Base URL of the page handling confirmation redirects, without a
    /// trailing slash.
    pub redirection_url: String,

    /// From-address on every notification.
    pub email_from: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            redirection_url: "http://localhost:8080".to_owned(),
            email_from: "no-reply@localhost".to_owned(),
        }
    }
}

impl LinkConfig {
    /// Link embedded in registration-confirmation and password-reset mail.
    pub fn confirm_link(&self, token: &str) -> String {
        format!("{}/confirmRedirect?token={token}", self.redirection_url)
    }

    /// Link embedded in email-change verification mail.
    pub fn verify_link(&self, token: &str) -> String {
        format!("{}/verifyEmail?token={token}", self.redirection_url)
    }
}
