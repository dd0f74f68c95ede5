//! Progress reporting for a journey.

use chrono::Utc;
use skill_loop_core::progress::{calculate_progress, PhaseProgress, ProgressPhase};
use skill_loop_core::types::{DbId, Timestamp};
use skill_loop_db::repositories::{JourneyRepo, PhaseRepo};

use crate::engine::JourneyEngine;
use crate::error::{EngineError, EngineResult};

impl JourneyEngine {
    /// Summarize a journey's completion. Read-only.
    pub async fn calculate_phase_progress(&self, journey_id: DbId) -> EngineResult<PhaseProgress> {
        self.calculate_phase_progress_at(journey_id, Utc::now()).await
    }

    pub async fn calculate_phase_progress_at(
        &self,
        journey_id: DbId,
        now: Timestamp,
    ) -> EngineResult<PhaseProgress> {
        let journey = JourneyRepo::find_by_id(&self.pool, journey_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Journey", journey_id))?;
        let phases = PhaseRepo::list_by_journey(&self.pool, journey_id)
            .await?
            .iter()
            .map(|p| p.progress_view())
            .collect::<Result<Vec<ProgressPhase>, _>>()?;

        Ok(calculate_progress(journey.category()?, journey.started_at, &phases, now))
    }
}
