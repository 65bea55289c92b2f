use async_trait::async_trait;

use crate::events::{AccountEvent, Listener};

/// Logs every account event via the `log` crate.
pub struct LoggingListener {
    level: log::Level,
}

impl LoggingListener {
    /// Logs at INFO.
    pub fn new() -> Self {
        Self {
            level: log::Level::Info,
        }
    }

    pub fn with_level(level: log::Level) -> Self {
        Self { level }
    }
}

impl Default for LoggingListener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Listener for LoggingListener {
    async fn handle(&self, event: &AccountEvent) {
        log::log!(
            target: "warden::events",
            self.level,
            "event={} {:?}",
            event.name(),
            event
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_handle_does_not_panic() {
        let listener = LoggingListener::with_level(log::Level::Debug);
        let event = AccountEvent::PasswordChanged {
            user_id: 1,
            at: Utc::now(),
        };
        listener.handle(&event).await;
    }
}
