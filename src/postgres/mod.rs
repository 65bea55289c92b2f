//! sqlx-backed store implementations.
//!
//! Enable with the `postgres` feature. Run [`migrations::run_core`] once at
//! startup to create the tables.

pub mod migrations;
mod token;
mod user;

pub use token::PostgresTokenStore;
pub use user::PostgresUserStore;
