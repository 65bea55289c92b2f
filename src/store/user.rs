use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Authorization role. Orthogonal to lifecycle state; this crate never
/// changes it after creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// The flow a confirmation token was minted for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingKind {
    Registration,
    PasswordReset,
    EmailChange { new_email: String },
}

/// A minted, not-yet-consumed confirmation token.
///
/// At most one pending action exists per user; minting a new one overwrites
/// any prior token. The flow tag and `issued_at` are checked on every
/// consumption, so a token can neither complete a flow it was not minted
/// for nor outlive its expiry window.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAction {
    pub kind: PendingKind,
    pub token: String,
    pub issued_at: DateTime<Utc>,
}

impl PendingAction {
    pub fn new(kind: PendingKind, token: String) -> Self {
        Self {
            kind,
            token,
            issued_at: Utc::now(),
        }
    }

    /// True once `issued_at` is further in the past than `window`.
    pub fn is_expired(&self, window: Duration) -> bool {
        self.issued_at + window < Utc::now()
    }
}

impl std::fmt::Debug for PendingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingAction")
            .field("kind", &self.kind)
            .field("token", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

/// The account entity.
///
/// `email` doubles as the login username and is unique across all users.
/// `version` is bumped by every successful [`UserStore::save`]; a save with
/// a stale version fails with [`AuthError::StaleVersion`] instead of
/// silently overwriting a concurrent write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub enabled: bool,
    pub pending: Option<PendingAction>,
    pub role: Role,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The address awaiting verification, if an email change is in flight.
    pub fn pending_email(&self) -> Option<&str> {
        match self.pending {
            Some(PendingAction {
                kind: PendingKind::EmailChange { ref new_email },
                ..
            }) => Some(new_email),
            _ => None,
        }
    }

    /// The outstanding confirmation token, if any flow is awaiting one.
    pub fn confirmation_token(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.token.as_str())
    }
}

#[cfg(any(test, feature = "mocks"))]
impl User {
    pub fn mock_from_email(email: &str) -> Self {
        let now = Utc::now();
        User {
            id: 1,
            email: email.to_owned(),
            password_hash: "fakehashedpassword".to_owned(),
            enabled: true,
            pending: None,
            role: Role::User,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn mock_from_credentials(email: &str, password_hash: &str) -> Self {
        User {
            password_hash: password_hash.to_owned(),
            ..User::mock_from_email(email)
        }
    }
}

/// Input for [`UserStore::create`]; the store assigns `id`, `version`, and
/// the timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub enabled: bool,
    pub pending: Option<PendingAction>,
    pub role: Role,
}

/// Durable, single-row storage for [`User`] entities.
///
/// Implementations must enforce email uniqueness on both `create` and
/// `save`, and must reject a `save` whose `version` no longer matches the
/// stored row. Lookups are exact matches.
#[async_trait]
pub trait UserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AuthError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;
    async fn find_by_confirmation_token(&self, token: &str) -> Result<Option<User>, AuthError>;

    /// Inserts a new user. Fails with [`AuthError::EmailTaken`] on an email
    /// collision.
    async fn create(&self, user: NewUser) -> Result<User, AuthError>;

    /// Persists a modified user and returns the stored copy with its
    /// version bumped.
    ///
    /// Fails with [`AuthError::StaleVersion`] if the row changed since it
    /// was read, and [`AuthError::EmailTaken`] if the email collides with
    /// another user.
    async fn save(&self, user: &User) -> Result<User, AuthError>;

    /// Hard delete.
    async fn delete(&self, id: i64) -> Result<(), AuthError>;
}
