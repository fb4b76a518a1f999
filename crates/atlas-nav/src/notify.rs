//! User-facing notifications

use serde::Serialize;
use tokio::sync::broadcast;

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

/// One toast-style message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

/// Broadcasts notifications to any number of listeners
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Notifier {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn send(&self, level: Level, message: impl Into<String>) {
        let notification = Notification {
            level,
            message: message.into(),
        };
        if level == Level::Error {
            tracing::warn!(message = %notification.message, "error notification");
        }
        // Nobody listening is fine.
        let _ = self.tx.send(notification);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.send(Level::Success, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.send(Level::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.send(Level::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(Level::Error, message);
    }
}
