//! Revocation edge cases at the operation level.
//!
//! Run with: `cargo test --features mocks --test revocation`

#![cfg(feature = "mocks")]
#![allow(clippy::unwrap_used)]

use warden::actions::{ChangePasswordAction, DeleteAccountAction};
use warden::crypto::{Argon2Hasher, PasswordHasher};
use warden::store::User;
use warden::{
    AuthError, MockTokenStore, MockUserStore, RevocationGateway, SecretString, UserStore,
};

fn seed_user(store: &MockUserStore, email: &str, password: &str) {
    let hashed = Argon2Hasher::default().hash(password).unwrap();
    store.seed(User::mock_from_credentials(email, &hashed));
}

#[tokio::test]
async fn password_change_succeeds_when_store_cannot_enumerate() {
    let users = MockUserStore::new();
    seed_user(&users, "alice@example.com", "OldPass1!");
    let tokens = MockTokenStore::without_user_lookup();
    tokens.issue("alice@example.com", "at-1", None);

    let action =
        ChangePasswordAction::new(users.clone(), RevocationGateway::new(tokens.clone()));
    let changed = action
        .execute(
            "alice@example.com",
            &SecretString::new("OldPass1!"),
            &SecretString::new("NewPass2!"),
        )
        .await
        .unwrap();

    // The change lands; revocation was a documented no-op
    assert!(changed);
    assert_eq!(tokens.remaining_for("alice@example.com"), 1);
}

#[tokio::test]
async fn password_change_survives_a_poisoned_token_row() {
    let users = MockUserStore::new();
    seed_user(&users, "alice@example.com", "OldPass1!");
    let tokens = MockTokenStore::new();
    tokens.issue("alice@example.com", "at-1", None);
    tokens.issue("alice@example.com", "at-2", Some("rt-2"));
    tokens.poison("at-1");

    let action =
        ChangePasswordAction::new(users.clone(), RevocationGateway::new(tokens.clone()));
    let changed = action
        .execute(
            "alice@example.com",
            &SecretString::new("OldPass1!"),
            &SecretString::new("NewPass2!"),
        )
        .await
        .unwrap();

    assert!(changed);
    // The healthy pair went away, the poisoned row stayed behind
    assert_eq!(tokens.remaining_for("alice@example.com"), 1);

    let user = users
        .find_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(
        Argon2Hasher::default()
            .verify("NewPass2!", &user.password_hash)
            .unwrap()
    );
}

#[tokio::test]
async fn deletion_is_not_blocked_by_revocation() {
    let users = MockUserStore::new();
    seed_user(&users, "alice@example.com", "OldPass1!");
    let tokens = MockTokenStore::new();
    tokens.issue("alice@example.com", "at-1", None);
    tokens.poison("at-1");

    let action = DeleteAccountAction::new(users.clone(), RevocationGateway::new(tokens));
    action.execute("alice@example.com").await.unwrap();

    assert!(
        users
            .find_by_email("alice@example.com")
            .await
            .unwrap()
            .is_none()
    );

    // Deleting again reports the account as gone
    let action = DeleteAccountAction::new(users, RevocationGateway::new(MockTokenStore::new()));
    assert_eq!(
        action.execute("alice@example.com").await.unwrap_err(),
        AuthError::UserNotFound
    );
}
