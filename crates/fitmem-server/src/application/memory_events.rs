//! Memory change notifications
//!
//! Broadcasts newly created memory records to whoever is listening at the
//! moment of creation. Delivery is best effort: a listener that subscribes
//! later, or falls behind the ring buffer, misses those events.

use serde::Serialize;
use tokio::sync::broadcast;

use fitmem::MemoryRecord;

/// Default ring buffer size per channel
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// A freshly created memory, tagged with its owner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryNotification {
    pub user_id: String,
    pub record: MemoryRecord,
}

/// Single-producer, multi-consumer change channel
#[derive(Debug, Clone)]
pub struct MemoryEvents {
    sender: broadcast::Sender<MemoryNotification>,
}

impl MemoryEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Attach a new listener
    pub fn subscribe(&self) -> MemorySubscription {
        MemorySubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Broadcast a creation. Returns how many listeners received it.
    pub fn emit(&self, user_id: &str, record: MemoryRecord) -> usize {
        let notification = MemoryNotification {
            user_id: user_id.to_string(),
            record,
        };
        // Err only means nobody is listening
        self.sender.send(notification).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Raw receiver for stream adapters
    pub(crate) fn receiver(&self) -> broadcast::Receiver<MemoryNotification> {
        self.sender.subscribe()
    }
}

impl Default for MemoryEvents {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

/// Handle returned by [`MemoryEvents::subscribe`]
pub struct MemorySubscription {
    receiver: broadcast::Receiver<MemoryNotification>,
}

impl MemorySubscription {
    /// Wait for the next notification.
    ///
    /// Returns `None` once the channel is closed. Events dropped because this
    /// listener lagged are skipped.
    pub async fn recv(&mut self) -> Option<MemoryNotification> {
        loop {
            match self.receiver.recv().await {
                Ok(notification) => return Some(notification),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Memory subscriber lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking poll for an already delivered notification
    pub fn try_recv(&mut self) -> Option<MemoryNotification> {
        loop {
            match self.receiver.try_recv() {
                Ok(notification) => return Some(notification),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }

    /// Detach from the channel
    pub fn unsubscribe(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitmem::{MemoryKind, MemorySource};

    fn record(value: &str) -> MemoryRecord {
        MemoryRecord::new(
            MemoryKind::PreferredExercise,
            value.to_string(),
            MemorySource::CompletedExercise,
        )
    }

    #[tokio::test]
    async fn test_every_subscriber_receives_emission() {
        let events = MemoryEvents::default();
        let mut first = events.subscribe();
        let mut second = events.subscribe();

        let delivered = events.emit("u1", record("Squats"));
        assert_eq!(delivered, 2);

        assert_eq!(first.recv().await.unwrap().record.value, "Squats");
        let got = second.recv().await.unwrap();
        assert_eq!(got.user_id, "u1");
        assert_eq!(got.record.value, "Squats");
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_events() {
        let events = MemoryEvents::default();
        assert_eq!(events.emit("u1", record("Squats")), 0);

        let mut late = events.subscribe();
        assert!(late.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_unsubscribe_detaches_listener() {
        let events = MemoryEvents::default();
        let subscription = events.subscribe();
        assert_eq!(events.subscriber_count(), 1);
        subscription.unsubscribe();
        assert_eq!(events.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_lagging_subscriber_skips_to_newest() {
        let events = MemoryEvents::new(2);
        let mut slow = events.subscribe();
        for value in ["A", "B", "C", "D"] {
            events.emit("u1", record(value));
        }
        assert_eq!(slow.recv().await.unwrap().record.value, "C");
        assert_eq!(slow.recv().await.unwrap().record.value, "D");
    }
}
