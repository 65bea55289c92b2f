//! Storage abstractions and the entities they hold.
//!
//! Implement these traits to plug in your own database, or enable the
//! `postgres` feature for the sqlx-backed implementations.
//!
//! # Traits
//!
//! | Trait | Description |
//! |-------|-------------|
//! | [`UserStore`] | User lookup and read-modify-write persistence |
//! | [`TokenStore`] | Access/refresh token enumeration and deletion |
//!
//! # Data Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`User`] | The account entity |
//! | [`PendingAction`] | A minted, not-yet-consumed confirmation token with its flow tag |
//! | [`IssuedToken`] | An access token (and optional linked refresh token) held by the external token store |
//!
//! # Mock Implementations
//!
//! Enable the `mocks` feature for in-memory implementations useful for
//! testing: [`MockUserStore`] and [`MockTokenStore`].

mod token;
mod user;

#[cfg(any(test, feature = "mocks"))]
mod token_mock;
#[cfg(any(test, feature = "mocks"))]
mod user_mock;

pub use token::IssuedToken;
pub use token::TokenStore;
pub use user::NewUser;
pub use user::PendingAction;
pub use user::PendingKind;
pub use user::Role;
pub use user::User;
pub use user::UserStore;

#[cfg(any(test, feature = "mocks"))]
pub use token_mock::MockTokenStore;
#[cfg(any(test, feature = "mocks"))]
pub use user_mock::MockUserStore;
