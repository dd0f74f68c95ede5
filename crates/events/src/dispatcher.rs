//! Event-to-notification routing.
//!
//! [`NotificationDispatcher`] subscribes to the [`EventBus`](crate::EventBus)
//! and, for each notification-worthy [`JourneyEvent`], works out who should
//! hear about it and calls the configured [`Notifier`].
//!
//! | Event               | Recipients                 |
//! |---------------------|----------------------------|
//! | `PHASE_OVERDUE`     | journey owner, mentor      |
//! | `JOURNEY_COMPLETED` | journey owner              |
//! | `PHASE_STARTED`     | mentor (when one is set)   |

use std::sync::Arc;

use skill_loop_core::activity::ActivityType;
use tokio::sync::broadcast;

use crate::bus::JourneyEvent;
use crate::notifier::{Notification, Notifier};

/// Background consumer that turns journey events into notifications.
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Run the dispatch loop until the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<JourneyEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.dispatch(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification dispatcher lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification dispatcher shutting down");
                    break;
                }
            }
        }
    }

    /// Deliver every notification an event produces. Failures are logged
    /// per recipient and do not stop the others.
    pub async fn dispatch(&self, event: &JourneyEvent) {
        for notification in notifications_for(event) {
            let recipient = notification.recipient_user_id;
            if let Err(e) = self.notifier.notify(notification).await {
                tracing::error!(
                    error = %e,
                    recipient_user_id = recipient,
                    journey_id = event.journey_id,
                    kind = %event.kind,
                    "Failed to deliver notification"
                );
            }
        }
    }
}

/// The notifications an event should produce, one per recipient.
pub fn notifications_for(event: &JourneyEvent) -> Vec<Notification> {
    if !event.kind.needs_notification() {
        return Vec::new();
    }

    let phase_label = event
        .phase_number
        .map(|n| format!("Phase {n}"))
        .unwrap_or_else(|| "A phase".to_string());

    let (recipients, title, body) = match event.kind {
        ActivityType::PhaseOverdue => {
            let mut recipients = vec![event.user_id];
            if let Some(mentor) = event.mentor_id.filter(|m| *m != event.user_id) {
                recipients.push(mentor);
            }
            (
                recipients,
                format!("{phase_label} is overdue"),
                format!("{phase_label} of journey {} passed its due date.", event.journey_id),
            )
        }
        ActivityType::JourneyCompleted => (
            vec![event.user_id],
            "Journey completed".to_string(),
            format!("All phases of journey {} are complete.", event.journey_id),
        ),
        ActivityType::PhaseStarted => match event.mentor_id {
            Some(mentor) => (
                vec![mentor],
                format!("{phase_label} started"),
                format!(
                    "{phase_label} of journey {} has started and you are its mentor.",
                    event.journey_id
                ),
            ),
            None => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    recipients
        .into_iter()
        .map(|recipient_user_id| Notification {
            recipient_user_id,
            kind: event.kind,
            journey_id: event.journey_id,
            phase_number: event.phase_number,
            title: title.clone(),
            body: body.clone(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::bus::EventBus;
    use crate::notifier::NotifyError;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(notification);
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn notify(&self, _notification: Notification) -> Result<(), NotifyError> {
            Err(NotifyError::Delivery("smtp down".into()))
        }
    }

    fn event(kind: ActivityType) -> JourneyEvent {
        JourneyEvent::new(kind, 5, 100, Utc::now()).with_phase(2)
    }

    #[test]
    fn test_overdue_notifies_owner_and_mentor() {
        let n = notifications_for(&event(ActivityType::PhaseOverdue).with_mentor(Some(200)));
        let recipients: Vec<_> = n.iter().map(|n| n.recipient_user_id).collect();
        assert_eq!(recipients, vec![100, 200]);
        assert_eq!(n[0].title, "Phase 2 is overdue");
    }

    #[test]
    fn test_overdue_without_mentor_notifies_owner_only() {
        let n = notifications_for(&event(ActivityType::PhaseOverdue));
        assert_eq!(n.len(), 1);
        assert_eq!(n[0].recipient_user_id, 100);
    }

    #[test]
    fn test_completion_notifies_owner() {
        let n = notifications_for(&JourneyEvent::new(
            ActivityType::JourneyCompleted,
            5,
            100,
            Utc::now(),
        ));
        assert_eq!(n.len(), 1);
        assert_eq!(n[0].title, "Journey completed");
    }

    #[test]
    fn test_phase_start_only_notifies_a_mentor() {
        assert!(notifications_for(&event(ActivityType::PhaseStarted)).is_empty());
        let n = notifications_for(&event(ActivityType::PhaseStarted).with_mentor(Some(300)));
        assert_eq!(n.len(), 1);
        assert_eq!(n[0].recipient_user_id, 300);
    }

    #[test]
    fn test_quiet_events_produce_nothing() {
        assert!(notifications_for(&event(ActivityType::JourneyPaused)).is_empty());
        assert!(notifications_for(&event(ActivityType::AssessmentLinked)).is_empty());
    }

    #[tokio::test]
    async fn test_run_loop_delivers_and_stops_when_bus_dropped() {
        let notifier = Arc::new(RecordingNotifier::default());
        let bus = EventBus::default();
        let dispatcher = NotificationDispatcher::new(notifier.clone());
        let handle = tokio::spawn(dispatcher.run(bus.subscribe()));

        bus.publish(event(ActivityType::PhaseOverdue));
        bus.publish(event(ActivityType::JourneyResumed));
        drop(bus);
        handle.await.unwrap();

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, ActivityType::PhaseOverdue);
    }

    #[tokio::test]
    async fn test_delivery_failure_does_not_panic() {
        let dispatcher = NotificationDispatcher::new(Arc::new(FailingNotifier));
        dispatcher
            .dispatch(&event(ActivityType::PhaseOverdue).with_mentor(Some(7)))
            .await;
    }
}
