//! Notification center
//!
//! One visible message at a time. `show` replaces the current message and
//! restarts the dwell timer; `dismiss` clears immediately. Views observe the
//! current message through a `watch` receiver.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;

use crate::config::NOTICE_DWELL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Success,
    Info,
}

/// A user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Monotonic id; a dwell timer only clears the notice it was started for
    pub id: u64,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct NotificationCenter {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    current: watch::Sender<Option<Notice>>,
    next_id: AtomicU64,
    dwell: Duration,
}

impl NotificationCenter {
    pub fn new(dwell: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                current,
                next_id: AtomicU64::new(0),
                dwell,
            }),
        }
    }

    /// Replace the visible message
    pub fn show(&self, message: impl Into<String>, severity: Severity) -> u64 {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let notice = Notice {
            id,
            severity,
            message: message.into(),
        };
        tracing::debug!(id, ?severity, message = %notice.message, "Notice shown");
        self.inner.current.send_replace(Some(notice));
        self.schedule_clear(id);
        id
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.show(message, Severity::Error)
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.show(message, Severity::Success)
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.show(message, Severity::Info)
    }

    /// Clear the visible message now
    pub fn dismiss(&self) {
        self.inner.current.send_replace(None);
    }

    pub fn current(&self) -> Option<Notice> {
        self.inner.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Notice>> {
        self.inner.current.subscribe()
    }

    fn schedule_clear(&self, id: u64) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(id, "No runtime, notice will not auto-dismiss");
            return;
        };
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let dwell = self.inner.dwell;
        handle.spawn(async move {
            tokio::time::sleep(dwell).await;
            if let Some(inner) = weak.upgrade() {
                inner.current.send_if_modified(|current| {
                    if current.as_ref().map(|n| n.id) == Some(id) {
                        *current = None;
                        true
                    } else {
                        false
                    }
                });
            }
        });
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(NOTICE_DWELL)
    }
}
