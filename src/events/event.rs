use chrono::{DateTime, Utc};

/// Lifecycle events emitted by warden actions.
#[derive(Debug, Clone)]
pub enum AccountEvent {
    RegistrationStarted {
        user_id: i64,
        email: String,
        at: DateTime<Utc>,
    },
    RegistrationConfirmed {
        user_id: i64,
        at: DateTime<Utc>,
    },
    PasswordResetRequested {
        user_id: i64,
        email: String,
        at: DateTime<Utc>,
    },
    PasswordChanged {
        user_id: i64,
        at: DateTime<Utc>,
    },
    EmailChangeRequested {
        user_id: i64,
        new_email: String,
        at: DateTime<Utc>,
    },
    EmailVerified {
        user_id: i64,
        email: String,
        at: DateTime<Utc>,
    },
    TokensRevoked {
        username: String,
        revoked: usize,
        failed: usize,
        at: DateTime<Utc>,
    },
    AccountDeleted {
        user_id: i64,
        at: DateTime<Utc>,
    },
}

impl AccountEvent {
    /// Dot-separated event name for logging/tracing.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RegistrationStarted { .. } => "account.registration_started",
            Self::RegistrationConfirmed { .. } => "account.registration_confirmed",
            Self::PasswordResetRequested { .. } => "password.reset_requested",
            Self::PasswordChanged { .. } => "password.changed",
            Self::EmailChangeRequested { .. } => "email.change_requested",
            Self::EmailVerified { .. } => "email.verified",
            Self::TokensRevoked { .. } => "tokens.revoked",
            Self::AccountDeleted { .. } => "account.deleted",
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::RegistrationStarted { at, .. }
            | Self::RegistrationConfirmed { at, .. }
            | Self::PasswordResetRequested { at, .. }
            | Self::PasswordChanged { at, .. }
            | Self::EmailChangeRequested { at, .. }
            | Self::EmailVerified { at, .. }
            | Self::TokensRevoked { at, .. }
            | Self::AccountDeleted { at, .. } => *at,
        }
    }
}
