//! Credential lifecycle management.
//!
//! `warden` owns the state transitions on a user account: registration with
//! email confirmation, password reset, authenticated password change,
//! two-step email change, account deletion, and revocation of previously
//! issued access/refresh tokens when a password changes.
//!
//! Storage, mail delivery, and message catalogs are reached through traits
//! ([`UserStore`], [`TokenStore`], [`Mailer`], [`Messages`]); callers wire in
//! their own implementations or enable the `postgres`/`smtp` features for
//! the built-in ones. The `mocks` feature provides in-memory implementations
//! for testing.

pub mod actions;
pub mod config;
pub mod crypto;
pub mod events;
pub mod mailer;
pub mod messages;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod revocation;
#[cfg(feature = "smtp")]
pub mod smtp;
pub mod store;
pub mod validators;

pub use config::WardenConfig;
pub use crypto::SecretString;
pub use mailer::Mailer;
pub use mailer::OutgoingMail;
pub use messages::Messages;
pub use revocation::RevocationGateway;
pub use revocation::RevocationOutcome;
pub use store::IssuedToken;
pub use store::NewUser;
pub use store::PendingAction;
pub use store::PendingKind;
pub use store::Role;
pub use store::TokenStore;
pub use store::User;
pub use store::UserStore;

#[cfg(any(test, feature = "mocks"))]
pub use mailer::MockMailer;
#[cfg(any(test, feature = "mocks"))]
pub use store::MockTokenStore;
#[cfg(any(test, feature = "mocks"))]
pub use store::MockUserStore;

use std::fmt;

use validators::ValidationError;

/// Errors surfaced by lifecycle operations.
///
/// Expected, user-triggerable outcomes (wrong password, duplicate email on
/// change) are ordinary return values on the operations themselves, not
/// variants here; this enum covers lookups that found nothing, storage
/// faults, and crypto failures.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    UserNotFound,
    TokenInvalid,
    TokenExpired,
    /// The store rejected a write because the email is already taken.
    EmailTaken,
    /// The store rejected a write because the row changed since it was read.
    StaleVersion,
    PasswordHashError,
    Validation(ValidationError),
    Storage(String),
    Mail(String),
}

impl std::error::Error for AuthError {}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::UserNotFound => write!(f, "User not found"),
            AuthError::TokenInvalid => write!(f, "Invalid token"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::EmailTaken => write!(f, "Email address is already in use"),
            AuthError::StaleVersion => write!(f, "Record was modified concurrently"),
            AuthError::PasswordHashError => write!(f, "Failed to hash password"),
            AuthError::Validation(e) => write!(f, "{e}"),
            AuthError::Storage(msg) => write!(f, "Storage error: {msg}"),
            AuthError::Mail(msg) => write!(f, "Mail error: {msg}"),
        }
    }
}

impl From<ValidationError> for AuthError {
    fn from(e: ValidationError) -> Self {
        AuthError::Validation(e)
    }
}
