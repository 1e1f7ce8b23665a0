//! Transient user-facing notifications (toasts).
//!
//! Every mutation on the context surfaces a notice; the UI layer drains
//! them into whatever toast mechanism it has. Delivery is fire-and-forget:
//! a notice with no subscriber is dropped, never an error.

use tokio::sync::broadcast;
use uuid::Uuid;

/// How many undelivered notices to buffer per subscriber.
const CHANNEL_CAPACITY: usize = 64;

/// Severity of a notice, mapped to toast styling by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// One transient notification.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Notice {
    /// Unique id, used by toast UIs as a render key.
    pub id: Uuid,
    /// Severity.
    pub level: NoticeLevel,
    /// Human-readable message.
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
        }
    }
}

/// Broadcast hub for notices.
#[derive(Debug)]
pub struct NoticeHub {
    tx: broadcast::Sender<Notice>,
}

impl NoticeHub {
    /// Create a hub with no subscribers yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tx: broadcast::Sender::new(CHANNEL_CAPACITY),
        }
    }

    /// Subscribe to future notices.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    /// Emit a success notice, returning it for by-value delivery.
    pub fn success(&self, message: impl Into<String>) -> Notice {
        self.emit(Notice::new(NoticeLevel::Success, message))
    }

    /// Emit an error notice, returning it for by-value delivery.
    pub fn error(&self, message: impl Into<String>) -> Notice {
        self.emit(Notice::new(NoticeLevel::Error, message))
    }

    /// Emit an informational notice, returning it for by-value delivery.
    pub fn info(&self, message: impl Into<String>) -> Notice {
        self.emit(Notice::new(NoticeLevel::Info, message))
    }

    fn emit(&self, notice: Notice) -> Notice {
        tracing::debug!(level = ?notice.level, message = %notice.message, "Notice");
        // No subscribers is fine; the session may not be watching yet.
        let _ = self.tx.send(notice.clone());
        notice
    }
}

impl Default for NoticeHub {
    fn default() -> Self {
        Self::new()
    }
}
