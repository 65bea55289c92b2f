#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use crate::AuthError;

use super::user::{NewUser, User, UserStore};

/// In-memory [`UserStore`] enforcing the same email uniqueness and
/// version checks a real backend would.
///
/// Clones share state, so a test can keep one handle for assertions while
/// handing another to an action.
#[derive(Clone)]
pub struct MockUserStore {
    pub users: Arc<Mutex<Vec<User>>>,
    next_id: Arc<AtomicI64>,
}

impl MockUserStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(vec![])),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Seeds a user directly, bypassing uniqueness checks.
    pub fn seed(&self, user: User) {
        let mut users = self.users.lock().unwrap();
        self.next_id.fetch_max(user.id + 1, Ordering::SeqCst);
        users.push(user);
    }
}

impl Default for MockUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MockUserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AuthError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_confirmation_token(&self, token: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.confirmation_token() == Some(token))
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, AuthError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken);
        }

        let now = Utc::now();
        let created = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            email: user.email,
            password_hash: user.password_hash,
            enabled: user.enabled,
            pending: user.pending,
            role: user.role,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        drop(users);

        Ok(created)
    }

    async fn save(&self, user: &User) -> Result<User, AuthError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(AuthError::EmailTaken);
        }

        let stored = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(AuthError::UserNotFound)?;
        if stored.version != user.version {
            return Err(AuthError::StaleVersion);
        }

        *stored = User {
            version: user.version + 1,
            updated_at: Utc::now(),
            ..user.clone()
        };
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AuthError> {
        let mut users = self.users.lock().unwrap();
        let len_before = users.len();
        users.retain(|u| u.id != id);
        if users.len() < len_before {
            Ok(())
        } else {
            Err(AuthError::UserNotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let store = MockUserStore::new();
        store.seed(User::mock_from_email("user@example.com"));

        let result = store
            .create(NewUser {
                email: "user@example.com".to_owned(),
                password_hash: String::new(),
                enabled: false,
                pending: None,
                role: Default::default(),
            })
            .await;

        assert_eq!(result.unwrap_err(), AuthError::EmailTaken);
    }

    #[tokio::test]
    async fn save_bumps_version_and_rejects_stale_writers() {
        let store = MockUserStore::new();
        store.seed(User::mock_from_email("user@example.com"));

        let mut first = store
            .find_by_email("user@example.com")
            .await
            .unwrap()
            .unwrap();
        let second = first.clone();

        first.enabled = false;
        let saved = store.save(&first).await.unwrap();
        assert_eq!(saved.version, first.version + 1);

        // Second writer read the row before the first committed.
        let result = store.save(&second).await;
        assert_eq!(result.unwrap_err(), AuthError::StaleVersion);
    }

    #[tokio::test]
    async fn save_rejects_email_collision_with_other_user() {
        let store = MockUserStore::new();
        store.seed(User::mock_from_email("alice@example.com"));
        let mut bob = User::mock_from_email("bob@example.com");
        bob.id = 2;
        store.seed(bob.clone());

        bob.email = "alice@example.com".to_owned();
        let result = store.save(&bob).await;
        assert_eq!(result.unwrap_err(), AuthError::EmailTaken);
    }

    #[tokio::test]
    async fn lookups_match_exactly() {
        let store = MockUserStore::new();
        let mut user = User::mock_from_email("alice@example.com");
        user.id = 7;
        store.seed(user);

        assert!(store.find_by_id(7).await.unwrap().is_some());
        assert!(store.find_by_id(8).await.unwrap().is_none());
        assert!(
            store
                .find_by_email("Alice@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn delete_missing_user_errors() {
        let store = MockUserStore::new();
        assert_eq!(store.delete(42).await.unwrap_err(), AuthError::UserNotFound);
    }
}
