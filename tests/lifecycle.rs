//! End-to-end lifecycle scenarios over the in-memory mocks.
//!
//! Run with: `cargo test --features mocks --test lifecycle`

#![cfg(feature = "mocks")]
#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use warden::actions::{
    ChangeEmailAction, ChangePasswordAction, ConfirmRegistrationAction, IsRegisteredAction,
    LookupByTokenAction, RegisterAction, RequestPasswordResetAction, VerifyEmailAction,
};
use warden::crypto::{Argon2Hasher, PasswordHasher};
use warden::messages::DefaultMessages;
use warden::{
    AuthError, MockMailer, MockTokenStore, MockUserStore, RevocationGateway, SecretString,
    UserStore, WardenConfig,
};

struct Harness {
    users: MockUserStore,
    tokens: MockTokenStore,
    mailer: MockMailer,
    config: WardenConfig,
}

impl Harness {
    fn new() -> Self {
        Self {
            users: MockUserStore::new(),
            tokens: MockTokenStore::new(),
            mailer: MockMailer::new(),
            config: WardenConfig::default(),
        }
    }

    fn register(&self) -> RegisterAction<MockUserStore> {
        RegisterAction::new(
            self.users.clone(),
            Arc::new(self.mailer.clone()),
            Arc::new(DefaultMessages),
            self.config.clone(),
        )
    }

    fn is_registered(&self) -> IsRegisteredAction<MockUserStore> {
        IsRegisteredAction::new(self.users.clone())
    }

    fn confirm(&self) -> ConfirmRegistrationAction<MockUserStore> {
        ConfirmRegistrationAction::new(self.users.clone(), self.config.tokens.clone())
    }

    fn request_reset(&self) -> RequestPasswordResetAction<MockUserStore> {
        RequestPasswordResetAction::new(
            self.users.clone(),
            Arc::new(self.mailer.clone()),
            Arc::new(DefaultMessages),
            self.config.clone(),
        )
    }

    fn change_password(&self) -> ChangePasswordAction<MockUserStore, MockTokenStore> {
        ChangePasswordAction::new(
            self.users.clone(),
            RevocationGateway::new(self.tokens.clone()),
        )
    }

    fn change_email(&self) -> ChangeEmailAction<MockUserStore> {
        ChangeEmailAction::new(
            self.users.clone(),
            Arc::new(self.mailer.clone()),
            Arc::new(DefaultMessages),
            self.config.clone(),
        )
    }

    fn verify_email(&self) -> VerifyEmailAction<MockUserStore> {
        VerifyEmailAction::new(self.users.clone(), self.config.tokens.clone())
    }

    fn lookup(&self) -> LookupByTokenAction<MockUserStore> {
        LookupByTokenAction::new(self.users.clone())
    }

    /// Registers and confirms an account, returning nothing; the store and
    /// outbox keep the evidence.
    async fn registered_user(&self, email: &str, password: &str) {
        self.register().execute(email, "en").await.unwrap();
        let token = self.latest_token(email).await;
        self.confirm()
            .execute(&token, &SecretString::new(password))
            .await
            .unwrap();
    }

    async fn latest_token(&self, email: &str) -> String {
        self.users
            .find_by_email(email)
            .await
            .unwrap()
            .unwrap()
            .confirmation_token()
            .unwrap()
            .to_owned()
    }
}

// =============================================================================
// Registration and confirmation
// =============================================================================

#[tokio::test]
async fn registration_creates_disabled_account_and_notifies() {
    let h = Harness::new();

    let user = h.register().execute("alice@example.com", "en").await.unwrap();

    assert!(!user.enabled);
    assert!(user.confirmation_token().is_some());

    let sent = h.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "alice@example.com");

    // Not yet registered for the outside world
    assert!(!h.is_registered().execute("alice@example.com").await.unwrap());
}

#[tokio::test]
async fn confirmation_enables_account_and_sets_password() {
    let h = Harness::new();
    h.register().execute("alice@example.com", "en").await.unwrap();
    let token = h.latest_token("alice@example.com").await;

    let user = h
        .confirm()
        .execute(&token, &SecretString::new("NewPass1!"))
        .await
        .unwrap();

    assert!(user.enabled);
    assert_eq!(user.confirmation_token(), None);
    assert!(
        Argon2Hasher::default()
            .verify("NewPass1!", &user.password_hash)
            .unwrap()
    );
    assert!(h.is_registered().execute("alice@example.com").await.unwrap());
}

#[tokio::test]
async fn confirming_twice_fails_with_token_invalid() {
    let h = Harness::new();
    h.register().execute("alice@example.com", "en").await.unwrap();
    let token = h.latest_token("alice@example.com").await;

    let password = SecretString::new("NewPass1!");
    h.confirm().execute(&token, &password).await.unwrap();

    let again = h.confirm().execute(&token, &password).await;
    assert_eq!(again.unwrap_err(), AuthError::TokenInvalid);

    // The consumed token is gone from lookups too
    assert!(h.lookup().execute(&token).await.unwrap().is_none());
}

// =============================================================================
// Password reset
// =============================================================================

#[tokio::test]
async fn reset_flow_mints_token_and_completes_via_confirmation() {
    let h = Harness::new();
    h.registered_user("alice@example.com", "NewPass1!").await;

    h.request_reset()
        .execute("alice@example.com", "en")
        .await
        .unwrap();

    let user = h
        .users
        .find_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    // Reset leaves the account enabled
    assert!(user.enabled);

    let token = h.latest_token("alice@example.com").await;
    let user = h
        .confirm()
        .execute(&token, &SecretString::new("AfterReset2!"))
        .await
        .unwrap();

    assert!(
        Argon2Hasher::default()
            .verify("AfterReset2!", &user.password_hash)
            .unwrap()
    );
}

// =============================================================================
// Password change and revocation
// =============================================================================

#[tokio::test]
async fn password_change_revokes_all_session_tokens() {
    let h = Harness::new();
    h.registered_user("alice@example.com", "NewPass1!").await;
    h.tokens.issue("alice@example.com", "at-1", Some("rt-1"));
    h.tokens.issue("alice@example.com", "at-2", None);
    h.tokens.issue("bob@example.com", "at-3", None);

    let changed = h
        .change_password()
        .execute(
            "alice@example.com",
            &SecretString::new("NewPass1!"),
            &SecretString::new("Changed2!"),
        )
        .await
        .unwrap();

    assert!(changed);
    assert_eq!(h.tokens.remaining_for("alice@example.com"), 0);
    assert_eq!(h.tokens.remaining_for("bob@example.com"), 1);
}

#[tokio::test]
async fn wrong_current_password_changes_nothing_and_revokes_nothing() {
    let h = Harness::new();
    h.registered_user("alice@example.com", "NewPass1!").await;
    h.tokens.issue("alice@example.com", "at-1", None);

    let changed = h
        .change_password()
        .execute(
            "alice@example.com",
            &SecretString::new("wrong"),
            &SecretString::new("X2y!longenough"),
        )
        .await
        .unwrap();

    assert!(!changed);
    assert_eq!(h.tokens.remaining_for("alice@example.com"), 1);

    let user = h
        .users
        .find_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(
        Argon2Hasher::default()
            .verify("NewPass1!", &user.password_hash)
            .unwrap()
    );
}

#[tokio::test]
async fn identical_old_and_new_passwords_are_the_callers_problem() {
    // The routing layer rejects current == new before calling in; the core
    // itself has no such guard and processes the rotation normally.
    let h = Harness::new();
    h.registered_user("alice@example.com", "NewPass1!").await;

    let changed = h
        .change_password()
        .execute(
            "alice@example.com",
            &SecretString::new("NewPass1!"),
            &SecretString::new("NewPass1!"),
        )
        .await
        .unwrap();

    assert!(changed);
}

// =============================================================================
// Email change and verification
// =============================================================================

#[tokio::test]
async fn email_change_to_taken_address_is_rejected() {
    let h = Harness::new();
    h.registered_user("alice@example.com", "NewPass1!").await;
    h.registered_user("bob@example.com", "BobPass1!").await;
    let mails_before = h.mailer.sent().len();

    let ok = h
        .change_email()
        .execute(
            "alice@example.com",
            &SecretString::new("NewPass1!"),
            "bob@example.com",
            "en",
        )
        .await
        .unwrap();

    assert!(!ok);
    assert_eq!(h.mailer.sent().len(), mails_before);

    let alice = h
        .users
        .find_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(alice.pending.is_none());
}

#[tokio::test]
async fn email_change_to_free_address_completes_via_verification() {
    let h = Harness::new();
    h.registered_user("alice@example.com", "NewPass1!").await;

    let ok = h
        .change_email()
        .execute(
            "alice@example.com",
            &SecretString::new("NewPass1!"),
            "alice2@example.com",
            "en",
        )
        .await
        .unwrap();
    assert!(ok);

    let alice = h
        .users
        .find_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(alice.pending_email(), Some("alice2@example.com"));

    let token = h.latest_token("alice@example.com").await;
    let verified = h.verify_email().execute(&token).await.unwrap().unwrap();

    assert_eq!(verified.email, "alice2@example.com");
    assert_eq!(verified.pending_email(), None);
    assert_eq!(verified.confirmation_token(), None);

    // Second consumption signals not-found
    assert!(h.verify_email().execute(&token).await.unwrap().is_none());
}

#[tokio::test]
async fn tokens_cannot_cross_flows() {
    let h = Harness::new();
    h.registered_user("alice@example.com", "NewPass1!").await;

    // A reset token cannot complete an email change
    h.request_reset()
        .execute("alice@example.com", "en")
        .await
        .unwrap();
    let reset_token = h.latest_token("alice@example.com").await;
    assert!(h.verify_email().execute(&reset_token).await.unwrap().is_none());

    // An email-change token cannot set a password
    h.change_email()
        .execute(
            "alice@example.com",
            &SecretString::new("NewPass1!"),
            "alice2@example.com",
            "en",
        )
        .await
        .unwrap();
    let change_token = h.latest_token("alice@example.com").await;
    let result = h
        .confirm()
        .execute(&change_token, &SecretString::new("Hijacked1!"))
        .await;
    assert_eq!(result.unwrap_err(), AuthError::TokenInvalid);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn stale_writer_loses_instead_of_silently_overwriting() {
    let h = Harness::new();
    h.registered_user("alice@example.com", "NewPass1!").await;

    let first = h
        .users
        .find_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    let mut second = first.clone();
    let mut first = first;

    first.enabled = false;
    h.users.save(&first).await.unwrap();

    second.email = "raced@example.com".to_owned();
    let result = h.users.save(&second).await;
    assert_eq!(result.unwrap_err(), AuthError::StaleVersion);
}
