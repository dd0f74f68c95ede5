//! Activity recording inside a transaction.
//!
//! Every activity written by the engine goes through [`ActivityRecorder`],
//! which appends the row and queues the matching [`JourneyEvent`] for
//! publication once the transaction commits.

use skill_loop_core::types::DbId;
use skill_loop_db::models::activity::{CreateActivity, JourneyActivity};
use skill_loop_db::repositories::ActivityRepo;
use skill_loop_events::{EventBus, JourneyEvent};
use sqlx::PgConnection;

#[derive(Debug, Default)]
pub(crate) struct ActivityRecorder {
    events: Vec<JourneyEvent>,
}

impl ActivityRecorder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append an activity for a journey owned by `owner_id`.
    ///
    /// `created_at` is raised to the journey's latest activity timestamp if
    /// it would otherwise sort before it, so the log stays non-decreasing.
    pub(crate) async fn record(
        &mut self,
        conn: &mut PgConnection,
        owner_id: DbId,
        mentor_id: Option<DbId>,
        mut activity: CreateActivity,
    ) -> Result<JourneyActivity, sqlx::Error> {
        if let Some(latest) = ActivityRepo::latest_created_at(&mut *conn, activity.journey_id).await? {
            if activity.created_at < latest {
                activity.created_at = latest;
            }
        }

        let row = ActivityRepo::create(conn, &activity).await?;

        let mut event = JourneyEvent::new(
            activity.activity_type,
            activity.journey_id,
            owner_id,
            row.created_at,
        )
        .with_mentor(mentor_id)
        .with_actor(activity.actor_user_id)
        .with_payload(activity.metadata);
        if let Some(phase_number) = activity.phase_number {
            event = event.with_phase(phase_number);
        }
        self.events.push(event);

        Ok(row)
    }

    /// Publish queued events. Call only after the transaction committed.
    pub(crate) fn publish(self, bus: &EventBus) {
        bus.publish_all(self.events);
    }
}
