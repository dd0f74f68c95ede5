//! Seam to the external notification subsystem.
//!
//! The journey engine never delivers alerts itself. It publishes events;
//! the [`NotificationDispatcher`](crate::NotificationDispatcher) turns the
//! relevant ones into [`Notification`]s and hands them to a [`Notifier`].

use async_trait::async_trait;
use serde::Serialize;
use skill_loop_core::activity::ActivityType;
use skill_loop_core::types::DbId;

/// One alert addressed to one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub recipient_user_id: DbId,
    pub kind: ActivityType,
    pub journey_id: DbId,
    pub phase_number: Option<i32>,
    pub title: String,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Delivers notifications to users.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Writes each notification to the log. Used until a delivery channel is
/// configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        tracing::info!(
            recipient_user_id = notification.recipient_user_id,
            kind = %notification.kind,
            journey_id = notification.journey_id,
            phase_number = notification.phase_number,
            title = %notification.title,
            "Journey notification"
        );
        Ok(())
    }
}
