use async_trait::async_trait;

use super::AccountEvent;

/// Handles events dispatched from lifecycle actions.
///
/// Handlers run inline on the dispatching task, in registration order;
/// keep them cheap or hand the event off to your own queue.
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    async fn handle(&self, event: &AccountEvent);
}
