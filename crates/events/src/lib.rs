//! Journey event bus and notification trigger points.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`. The journey engine publishes a
//!   [`JourneyEvent`] for every activity it commits.
//! - [`Notifier`]: the seam to the external notification subsystem.
//! - [`NotificationDispatcher`]: background consumer that turns
//!   notification-worthy events into [`Notification`]s.

pub mod bus;
pub mod dispatcher;
pub mod notifier;

pub use bus::{EventBus, JourneyEvent};
pub use dispatcher::NotificationDispatcher;
pub use notifier::{LogNotifier, Notification, NotifyError, Notifier};
