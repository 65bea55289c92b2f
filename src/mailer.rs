//! Outbound notification dispatch.
//!
//! Actions hand a fully composed [`OutgoingMail`] to a [`Mailer`] after the
//! store write has committed. `send` means *enqueue*: implementations must
//! not block the caller on actual delivery. [`BackgroundMailer`] provides
//! that decoupling for any inner transport by spawning delivery onto the
//! runtime and logging failures.

use async_trait::async_trait;
use std::sync::Arc;

use crate::AuthError;

/// A composed notification: recipient, sender, subject, catalog body, and
/// the confirmation link to embed.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub message: String,
    pub link: String,
}

/// Queues a message for delivery.
///
/// A returned error means the message could not even be enqueued; actions
/// log it and carry on, since by contract the triggering operation has
/// already committed.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), AuthError>;
}

/// Decouples delivery from the request path.
///
/// `send` spawns the inner mailer's delivery as a background task and
/// returns immediately; a delivery failure is logged, never surfaced.
pub struct BackgroundMailer<M: Mailer + 'static> {
    inner: Arc<M>,
}

impl<M: Mailer + 'static> BackgroundMailer<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }
}

#[async_trait]
impl<M: Mailer + 'static> Mailer for BackgroundMailer<M> {
    async fn send(&self, mail: OutgoingMail) -> Result<(), AuthError> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let to = mail.to.clone();
            if let Err(e) = inner.send(mail).await {
                log::warn!(
                    target: "warden_auth",
                    "msg=\"mail delivery failed\", to={to}, error={e}"
                );
            }
        });
        Ok(())
    }
}

#[cfg(any(test, feature = "mocks"))]
pub use mock::MockMailer;

#[cfg(any(test, feature = "mocks"))]
mod mock {
    #![allow(clippy::unwrap_used)]

    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::{Mailer, OutgoingMail};
    use crate::AuthError;

    /// Records sends into an outbox instead of delivering anything.
    #[derive(Clone, Default)]
    pub struct MockMailer {
        pub outbox: Arc<Mutex<Vec<OutgoingMail>>>,
        failing: bool,
    }

    impl MockMailer {
        pub fn new() -> Self {
            Self::default()
        }

        /// A mailer whose every send fails, for exercising the
        /// logged-not-surfaced contract.
        pub fn failing() -> Self {
            Self {
                failing: true,
                ..Self::default()
            }
        }

        pub fn sent(&self) -> Vec<OutgoingMail> {
            self.outbox.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for MockMailer {
        async fn send(&self, mail: OutgoingMail) -> Result<(), AuthError> {
            if self.failing {
                return Err(AuthError::Mail("smtp relay unreachable".to_owned()));
            }
            self.outbox.lock().unwrap().push(mail);
            Ok(())
        }
    }
}
