//! Out-of-band notifications from the orchestrator.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Notifications kept for slow listeners before they start lagging.
const EVENT_CAPACITY: usize = 1024;

/// Unsolicited progress notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum Notification {
    /// One item finished downloading.
    Progress {
        /// 1-based index of the finished item.
        current: u32,
        /// Size of its batch.
        total: u32,
        /// Items still queued.
        remaining: usize,
        /// Items downloaded or skipped so far.
        downloaded: u32,
        #[serde(rename = "totalFiles")]
        total_files: u32,
    },

    /// A milestone cooldown began; `duration` is in milliseconds.
    CooldownStarted { duration: u64 },

    /// The loop halted on request; saved state is kept for resume.
    Stopped,

    /// The queue drained; saved state was cleared.
    Complete,
}

impl Notification {
    /// Whether this notification ends a run of the loop.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Notification::Stopped | Notification::Complete)
    }
}

/// Fire-and-forget broadcast of [`Notification`]s.
///
/// Publishing with nobody listening is a no-op.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Notification>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, notification: Notification) {
        if let Err(broadcast::error::SendError(notification)) = self.sender.send(notification) {
            tracing::trace!("No listeners for {:?}", notification);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}
