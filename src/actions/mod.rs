//! One action type per lifecycle operation.
//!
//! Each action owns the collaborators it needs and exposes a single
//! `execute` method. All of them are single-entity read-modify-write
//! against the [`UserStore`](crate::UserStore); operations that notify do
//! so only after the store write has committed.

mod change_email;
mod change_password;
mod confirm_registration;
mod delete_account;
mod is_registered;
mod lookup_by_token;
mod register;
mod request_password_reset;
mod verify_email;

pub use change_email::ChangeEmailAction;
pub use change_password::ChangePasswordAction;
pub use confirm_registration::ConfirmRegistrationAction;
pub use delete_account::DeleteAccountAction;
pub use is_registered::IsRegisteredAction;
pub use lookup_by_token::LookupByTokenAction;
pub use register::RegisterAction;
pub use request_password_reset::RequestPasswordResetAction;
pub use verify_email::VerifyEmailAction;
