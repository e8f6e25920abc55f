//! Navigation event bus (spec.md §4.J "navigation history"): lets an agent
//! runtime or an observer subscribe to what the navigator is doing.
//! Grounded in the teacher's `src/api/events.rs` tagged-enum event shape,
//! adapted from its SSE broadcast to a plain `tokio::sync::broadcast`
//! channel since this crate has no outward SSE surface for the client side.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NavigationEvent {
    Fetched {
        url: String,
        status: u16,
        at: DateTime<Utc>,
    },
    CacheHit {
        url: String,
        at: DateTime<Utc>,
    },
    Retried {
        url: String,
        attempt: u32,
        at: DateTime<Utc>,
    },
    OperationExecuted {
        target_url: String,
        status: u16,
        at: DateTime<Utc>,
    },
    Failed {
        url: String,
        reason: String,
        at: DateTime<Utc>,
    },
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<NavigationEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        let (sender, _receiver) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NavigationEvent> {
        self.sender.subscribe()
    }

    /// Publishing is best-effort: a bus with no subscribers drops the
    /// event silently, matching a broadcast channel's normal semantics.
    pub fn publish(&self, event: NavigationEvent) {
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        bus.publish(NavigationEvent::CacheHit {
            url: "https://x/a".into(),
            at: Utc::now(),
        });
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, NavigationEvent::CacheHit { .. }));
    }

    #[test]
    fn publish_without_subscribers_does_not_panic() {
        let bus = EventBus::new();
        bus.publish(NavigationEvent::Fetched {
            url: "https://x/a".into(),
            status: 200,
            at: Utc::now(),
        });
    }
}
