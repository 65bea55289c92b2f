use crate::AuthError;
use crate::store::UserStore;

/// Whether an email belongs to a confirmed account.
///
/// An existing but never-confirmed record counts as *not* registered, which
/// is what lets its owner re-register for a fresh confirmation token.
pub struct IsRegisteredAction<S: UserStore> {
    user_store: S,
}

impl<S: UserStore> IsRegisteredAction<S> {
    pub fn new(user_store: S) -> Self {
        IsRegisteredAction { user_store }
    }

    pub async fn execute(&self, email: &str) -> Result<bool, AuthError> {
        let user = self.user_store.find_by_email(email).await?;
        Ok(user.map(|u| u.enabled).unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MockUserStore, User};

    #[tokio::test]
    async fn test_enabled_user_is_registered() {
        let store = MockUserStore::new();
        store.seed(User::mock_from_email("alice@example.com"));

        let action = IsRegisteredAction::new(store);
        assert!(action.execute("alice@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_unconfirmed_user_is_not_registered() {
        let store = MockUserStore::new();
        let mut user = User::mock_from_email("alice@example.com");
        user.enabled = false;
        store.seed(user);

        let action = IsRegisteredAction::new(store);
        assert!(!action.execute("alice@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_email_is_not_registered() {
        let action = IsRegisteredAction::new(MockUserStore::new());
        assert!(!action.execute("nobody@example.com").await.unwrap());
    }
}
