//! Side channel for user-visible notifications
//!
//! Failures in this crate never cross component boundaries as errors or
//! panics; they surface as a `None` return plus a [`Notice`] pushed here.
//! The UI drains the receiver and renders notices as transient toasts.

use tokio::sync::mpsc;

/// Severity of a notice, mapped to toast styling by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A user-visible toast message.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Create a connected notice channel.
///
/// The [`Notices`] half is cloned into every component that reports
/// failures; the receiver belongs to whatever renders toasts.
pub fn channel() -> (Notices, mpsc::UnboundedReceiver<Notice>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Notices { tx }, rx)
}

/// Cloneable sender handle for pushing notices.
#[derive(Debug, Clone)]
pub struct Notices {
    tx: mpsc::UnboundedSender<Notice>,
}

impl Notices {
    /// A sender whose notices go nowhere (headless use, tests).
    pub fn disconnected() -> Self {
        let (tx, _rx) = mpsc::unbounded_channel();
        Self { tx }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Error, message);
    }

    fn push(&self, level: NoticeLevel, message: impl Into<String>) {
        let notice = Notice {
            level,
            message: message.into(),
        };
        // The receiver may already be gone during teardown.
        let _ = self.tx.send(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notices_delivered_in_order() {
        let (notices, mut rx) = channel();
        notices.error("first");
        notices.warning("second");

        let first = rx.try_recv().unwrap();
        assert_eq!(first.level, NoticeLevel::Error);
        assert_eq!(first.message, "first");

        let second = rx.try_recv().unwrap();
        assert_eq!(second.level, NoticeLevel::Warning);
        assert_eq!(second.message, "second");

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_disconnected_sender_does_not_panic() {
        let notices = Notices::disconnected();
        notices.error("dropped on the floor");
    }
}
