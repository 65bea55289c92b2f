use crate::AuthError;
use crate::store::{User, UserStore};

/// Resolves a confirmation token to its user without consuming it.
///
/// Used by confirmation-page rendering to show who the token belongs to
/// before the user submits the form that actually consumes it.
pub struct LookupByTokenAction<S: UserStore> {
    user_store: S,
}

impl<S: UserStore> LookupByTokenAction<S> {
    pub fn new(user_store: S) -> Self {
        LookupByTokenAction { user_store }
    }

    pub async fn execute(&self, token: &str) -> Result<Option<User>, AuthError> {
        self.user_store.find_by_confirmation_token(token).await
    }
}
