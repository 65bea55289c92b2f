use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::store::{NewUser, PendingAction, PendingKind, Role, User, UserStore};
use crate::AuthError;

const USER_COLUMNS: &str = "id, email, password_hash, enabled, pending_kind, pending_email, \
     confirmation_token, token_issued_at, role, version, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRecord {
    id: i64,
    email: String,
    password_hash: String,
    enabled: bool,
    pending_kind: Option<String>,
    pending_email: Option<String>,
    confirmation_token: Option<String>,
    token_issued_at: Option<DateTime<Utc>>,
    role: String,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRecord {
    fn into_user(self) -> Result<User, AuthError> {
        let pending = match (self.pending_kind, self.confirmation_token, self.token_issued_at) {
            (Some(kind), Some(token), Some(issued_at)) => {
                let kind = match kind.as_str() {
                    "registration" => PendingKind::Registration,
                    "password_reset" => PendingKind::PasswordReset,
                    "email_change" => PendingKind::EmailChange {
                        new_email: self.pending_email.ok_or_else(|| {
                            AuthError::Storage(
                                "email_change row without pending_email".to_owned(),
                            )
                        })?,
                    },
                    other => {
                        return Err(AuthError::Storage(format!(
                            "unknown pending_kind: {other}"
                        )));
                    }
                };
                Some(PendingAction {
                    kind,
                    token,
                    issued_at,
                })
            }
            (None, None, None) => None,
            _ => {
                return Err(AuthError::Storage(
                    "inconsistent pending-action columns".to_owned(),
                ));
            }
        };

        let role = match self.role.as_str() {
            "user" => Role::User,
            "admin" => Role::Admin,
            other => return Err(AuthError::Storage(format!("unknown role: {other}"))),
        };

        Ok(User {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            enabled: self.enabled,
            pending,
            role,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Admin => "admin",
    }
}

fn pending_columns(
    pending: &Option<PendingAction>,
) -> (
    Option<&'static str>,
    Option<&str>,
    Option<&str>,
    Option<DateTime<Utc>>,
) {
    match pending {
        Some(p) => {
            let (kind, pending_email) = match &p.kind {
                PendingKind::Registration => ("registration", None),
                PendingKind::PasswordReset => ("password_reset", None),
                PendingKind::EmailChange { new_email } => {
                    ("email_change", Some(new_email.as_str()))
                }
            };
            (
                Some(kind),
                pending_email,
                Some(p.token.as_str()),
                Some(p.issued_at),
            )
        }
        None => (None, None, None, None),
    }
}

fn map_db_error(e: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(ref db) = e {
        if db.code().as_deref() == Some("23505") {
            return AuthError::EmailTaken;
        }
    }
    AuthError::Storage(e.to_string())
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AuthError> {
        let row: Option<UserRecord> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_db_error)?;

        row.map(UserRecord::into_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let row: Option<UserRecord> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_db_error)?;

        row.map(UserRecord::into_user).transpose()
    }

    async fn find_by_confirmation_token(&self, token: &str) -> Result<Option<User>, AuthError> {
        let row: Option<UserRecord> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE confirmation_token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(UserRecord::into_user).transpose()
    }

    async fn create(&self, user: NewUser) -> Result<User, AuthError> {
        let (kind, pending_email, token, issued_at) = pending_columns(&user.pending);

        let row: UserRecord = sqlx::query_as(&format!(
            "INSERT INTO users (email, password_hash, enabled, pending_kind, pending_email, \
             confirmation_token, token_issued_at, role) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.enabled)
        .bind(kind)
        .bind(pending_email)
        .bind(token)
        .bind(issued_at)
        .bind(role_str(user.role))
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.into_user()
    }

    async fn save(&self, user: &User) -> Result<User, AuthError> {
        let (kind, pending_email, token, issued_at) = pending_columns(&user.pending);

        // Compare-and-set on version; zero rows means either a concurrent
        // writer or a vanished row.
        let row: Option<UserRecord> = sqlx::query_as(&format!(
            "UPDATE users SET email = $1, password_hash = $2, enabled = $3, \
             pending_kind = $4, pending_email = $5, confirmation_token = $6, \
             token_issued_at = $7, role = $8, version = version + 1, updated_at = NOW() \
             WHERE id = $9 AND version = $10 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.enabled)
        .bind(kind)
        .bind(pending_email)
        .bind(token)
        .bind(issued_at)
        .bind(role_str(user.role))
        .bind(user.id)
        .bind(user.version)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        match row {
            Some(row) => row.into_user(),
            None => {
                let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
                    .bind(user.id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_db_error)?;

                if exists.is_some() {
                    Err(AuthError::StaleVersion)
                } else {
                    Err(AuthError::UserNotFound)
                }
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<(), AuthError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }

        Ok(())
    }
}
