//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] fans out [`JourneyEvent`]s to any number of subscribers.
//! It is shared via `Arc<EventBus>` between the journey engine (publisher)
//! and background consumers such as the notification dispatcher.

use serde::{Deserialize, Serialize};
use skill_loop_core::activity::ActivityType;
use skill_loop_core::types::{DbId, Timestamp};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// JourneyEvent
// ---------------------------------------------------------------------------

/// Something that happened to a journey, published after the transaction
/// that caused it has committed.
///
/// Constructed via [`JourneyEvent::new`] and enriched with the builder
/// methods [`with_phase`](JourneyEvent::with_phase),
/// [`with_mentor`](JourneyEvent::with_mentor),
/// [`with_actor`](JourneyEvent::with_actor), and
/// [`with_payload`](JourneyEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyEvent {
    /// Same vocabulary as the activity log.
    pub kind: ActivityType,

    pub journey_id: DbId,

    /// Owner of the journey.
    pub user_id: DbId,

    /// Phase the event concerns, if any.
    pub phase_number: Option<i32>,

    /// Mentor of that phase, if one is assigned.
    pub mentor_id: Option<DbId>,

    /// User who caused the event, if it was not automatic.
    pub actor_user_id: Option<DbId>,

    /// Event-specific data (mirrors the activity metadata).
    pub payload: serde_json::Value,

    pub timestamp: Timestamp,
}

impl JourneyEvent {
    /// Create an event with only the required fields.
    pub fn new(kind: ActivityType, journey_id: DbId, user_id: DbId, timestamp: Timestamp) -> Self {
        Self {
            kind,
            journey_id,
            user_id,
            phase_number: None,
            mentor_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp,
        }
    }

    pub fn with_phase(mut self, phase_number: i32) -> Self {
        self.phase_number = Some(phase_number);
        self
    }

    pub fn with_mentor(mut self, mentor_id: Option<DbId>) -> Self {
        self.mentor_id = mentor_id;
        self
    }

    pub fn with_actor(mut self, user_id: Option<DbId>) -> Self {
        self.actor_user_id = user_id;
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use chrono::Utc;
/// use skill_loop_core::activity::ActivityType;
/// use skill_loop_events::bus::{EventBus, JourneyEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(JourneyEvent::new(ActivityType::JourneyStarted, 1, 7, Utc::now()));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<JourneyEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped; the activity log is the
    /// durable record.
    pub fn publish(&self, event: JourneyEvent) {
        // SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Publish several events in order.
    pub fn publish_all(&self, events: impl IntoIterator<Item = JourneyEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<JourneyEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[tokio::test]
    async fn test_publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let event = JourneyEvent::new(ActivityType::PhaseOverdue, 3, 7, Utc::now())
            .with_phase(2)
            .with_mentor(Some(9))
            .with_payload(serde_json::json!({"due_date": "2024-01-04"}));

        bus.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.kind, ActivityType::PhaseOverdue);
        assert_eq!(received.journey_id, 3);
        assert_eq!(received.phase_number, Some(2));
        assert_eq!(received.mentor_id, Some(9));
        assert_eq!(received.payload["due_date"], "2024-01-04");
    }

    #[tokio::test]
    async fn test_publish_all_preserves_order() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let now = Utc::now();

        bus.publish_all([
            JourneyEvent::new(ActivityType::PhaseAutoCompleted, 1, 1, now),
            JourneyEvent::new(ActivityType::PhaseStarted, 1, 1, now),
        ]);

        assert_eq!(rx.recv().await.unwrap().kind, ActivityType::PhaseAutoCompleted);
        assert_eq!(rx.recv().await.unwrap().kind, ActivityType::PhaseStarted);
    }

    #[test]
    fn test_publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(JourneyEvent::new(ActivityType::JourneyPaused, 1, 1, Utc::now()));
    }

    #[test]
    fn test_default_event_has_empty_optional_fields() {
        let event = JourneyEvent::new(ActivityType::JourneyStarted, 1, 2, Utc::now());
        assert!(event.phase_number.is_none());
        assert!(event.mentor_id.is_none());
        assert!(event.actor_user_id.is_none());
        assert!(event.payload.is_object());
    }
}
