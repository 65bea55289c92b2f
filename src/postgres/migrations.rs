//! Database migrations.
//!
//! ```rust,ignore
//! use warden::postgres::migrations;
//! use sqlx::PgPool;
//!
//! async fn setup(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//!     migrations::run_core(pool).await
//! }
//! ```

use sqlx::PgPool;

/// Creates the `users`, `access_tokens`, and `refresh_tokens` tables.
pub async fn run_core(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations/core").run(pool).await
}
