//! Domain notifications for co-resident code.
//!
//! Replaces the page-level `rp:cart-updated` DOM event with a broadcast
//! channel. Publishing is fire-and-forget: lagging or absent subscribers
//! never block or fail the session lifecycle.

use tokio::sync::broadcast;

use romanpie_core::CartLine;

const CHANNEL_CAPACITY: usize = 16;

/// A notification emitted by the session manager.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The cart cache was overwritten with a fresh snapshot.
    CartUpdated {
        /// The normalized lines now in the cache (possibly empty).
        lines: Vec<CartLine>,
    },
}

/// Handle to the session notification channel.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    /// Create a new notification channel.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Subscribe to notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Publish a notification to all current subscribers.
    ///
    /// A send error only means there are no subscribers, which is fine.
    pub(crate) fn publish(&self, event: SessionEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
