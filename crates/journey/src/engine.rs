//! [`JourneyEngine`] handle and its read operations.
//!
//! Write operations live in sibling modules as further `impl JourneyEngine`
//! blocks; this module holds the struct, the shared lookup helpers, and the
//! read-only queries the API exposes.

use std::sync::Arc;

use skill_loop_core::types::DbId;
use skill_loop_db::models::activity::JourneyActivity;
use skill_loop_db::models::journey::{Journey, JourneyDetail};
use skill_loop_db::models::phase::JourneyPhase;
use skill_loop_db::repositories::{ActivityRepo, JourneyRepo, PhaseRepo};
use skill_loop_db::DbPool;
use skill_loop_events::EventBus;
use sqlx::PgConnection;

use crate::error::{EngineError, EngineResult};

/// Coordinates every journey state change.
///
/// Cheap to clone; clones share the pool and the event bus.
#[derive(Clone)]
pub struct JourneyEngine {
    pub(crate) pool: DbPool,
    pub(crate) event_bus: Arc<EventBus>,
}

impl JourneyEngine {
    pub fn new(pool: DbPool, event_bus: Arc<EventBus>) -> Self {
        Self { pool, event_bus }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// A journey with its phases in phase-number order.
    pub async fn get_journey(&self, journey_id: DbId) -> EngineResult<JourneyDetail> {
        let journey = JourneyRepo::find_by_id(&self.pool, journey_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Journey", journey_id))?;
        let phases = PhaseRepo::list_by_journey(&self.pool, journey_id).await?;
        Ok(JourneyDetail { journey, phases })
    }

    /// The user's open journey, or their most recent one if none is open.
    pub async fn current_journey_for_user(&self, user_id: DbId) -> EngineResult<Option<JourneyDetail>> {
        let journey = match JourneyRepo::find_open_for_user(&self.pool, user_id).await? {
            Some(open) => Some(open),
            None => JourneyRepo::find_latest_for_user(&self.pool, user_id).await?,
        };
        let Some(journey) = journey else {
            return Ok(None);
        };
        let phases = PhaseRepo::list_by_journey(&self.pool, journey.id).await?;
        Ok(Some(JourneyDetail { journey, phases }))
    }

    /// Every journey of a user, newest cycle first.
    pub async fn list_journeys_for_user(&self, user_id: DbId) -> EngineResult<Vec<Journey>> {
        Ok(JourneyRepo::list_for_user(&self.pool, user_id).await?)
    }

    /// A journey's activity log in chronological order.
    pub async fn list_activities(&self, journey_id: DbId) -> EngineResult<Vec<JourneyActivity>> {
        if JourneyRepo::find_by_id(&self.pool, journey_id).await?.is_none() {
            return Err(EngineError::not_found("Journey", journey_id));
        }
        Ok(ActivityRepo::list_by_journey(&self.pool, journey_id).await?)
    }
}

// ---------------------------------------------------------------------------
// Lookup helpers shared by the write paths
// ---------------------------------------------------------------------------

/// Lock a journey row for the rest of the transaction.
pub(crate) async fn lock_journey(conn: &mut PgConnection, journey_id: DbId) -> EngineResult<Journey> {
    JourneyRepo::lock_by_id(conn, journey_id)
        .await?
        .ok_or_else(|| EngineError::not_found("Journey", journey_id))
}

/// Resolve the journey a phase belongs to without taking any lock.
pub(crate) async fn journey_of_phase(pool: &DbPool, phase_id: DbId) -> EngineResult<DbId> {
    PhaseRepo::find_by_id(pool, phase_id)
        .await?
        .map(|p| p.journey_id)
        .ok_or_else(|| EngineError::not_found("Phase", phase_id))
}

/// Re-read a phase after its journey is locked.
pub(crate) async fn reload_phase(conn: &mut PgConnection, phase_id: DbId) -> EngineResult<JourneyPhase> {
    PhaseRepo::find_by_id(&mut *conn, phase_id)
        .await?
        .ok_or_else(|| EngineError::not_found("Phase", phase_id))
}
