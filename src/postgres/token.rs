use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::crypto::hash_token;
use crate::store::{IssuedToken, TokenStore};
use crate::AuthError;

/// Token store over the access/refresh token tables of an OAuth2-style
/// authorization server.
///
/// Rows are keyed by the SHA-256 of the token value so a raw dump of the
/// key column is useless; the value itself is stored alongside for
/// per-user enumeration.
#[derive(Clone)]
pub struct PostgresTokenStore {
    pool: PgPool,
}

impl PostgresTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records an issued token pair.
    ///
    /// Issuance belongs to the authorization server; this exists for
    /// deployments where that server shares these tables, and for tests.
    pub async fn record(
        &self,
        username: &str,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<(), AuthError> {
        sqlx::query(
            "INSERT INTO access_tokens (token_id, token, username, refresh_token) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(hash_token(access_token))
        .bind(access_token)
        .bind(username)
        .bind(refresh_token)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?;

        if let Some(refresh) = refresh_token {
            sqlx::query(
                "INSERT INTO refresh_tokens (token_id, token, username) VALUES ($1, $2, $3)",
            )
            .bind(hash_token(refresh))
            .bind(refresh)
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        }

        Ok(())
    }
}

#[derive(FromRow)]
struct TokenRecord {
    token: String,
    username: String,
    refresh_token: Option<String>,
    issued_at: DateTime<Utc>,
}

impl From<TokenRecord> for IssuedToken {
    fn from(row: TokenRecord) -> Self {
        IssuedToken {
            username: row.username,
            access_token: row.token,
            refresh_token: row.refresh_token,
            issued_at: row.issued_at,
        }
    }
}

#[async_trait]
impl TokenStore for PostgresTokenStore {
    async fn find_tokens_by_username(
        &self,
        username: &str,
    ) -> Result<Vec<IssuedToken>, AuthError> {
        let rows: Vec<TokenRecord> = sqlx::query_as(
            "SELECT token, username, refresh_token, issued_at \
             FROM access_tokens WHERE username = $1",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn remove_access_token(&self, token: &str) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM access_tokens WHERE token_id = $1")
            .bind(hash_token(token))
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn remove_refresh_token(&self, token: &str) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE token_id = $1")
            .bind(hash_token(token))
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(())
    }
}
