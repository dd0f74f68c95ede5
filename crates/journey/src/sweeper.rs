//! Overdue detection.
//!
//! The sweep marks every `in_progress` phase of an `in_progress` journey
//! whose due date has passed. Each phase is handled in its own transaction
//! so one failure does not roll back the others; a phase that failed stays
//! `in_progress` and is picked up by the next sweep.

use chrono::Utc;
use serde_json::json;
use skill_loop_core::activity::ActivityType;
use skill_loop_core::journey::JourneyStatus;
use skill_loop_core::types::Timestamp;
use skill_loop_db::models::activity::CreateActivity;
use skill_loop_db::models::phase::OverdueCandidate;
use skill_loop_db::repositories::PhaseRepo;

use crate::engine::{lock_journey, reload_phase, JourneyEngine};
use crate::error::EngineResult;
use crate::recorder::ActivityRecorder;

impl JourneyEngine {
    /// Mark past-due phases overdue and return how many were marked.
    ///
    /// Idempotent: a phase already marked is no longer a candidate, so a
    /// second sweep at the same instant marks nothing.
    pub async fn check_overdue_phases(&self) -> EngineResult<usize> {
        self.check_overdue_phases_at(Utc::now()).await
    }

    pub async fn check_overdue_phases_at(&self, now: Timestamp) -> EngineResult<usize> {
        let candidates = PhaseRepo::list_overdue_candidates(&self.pool, now).await?;
        if candidates.is_empty() {
            tracing::debug!("Overdue sweep found nothing to mark");
            return Ok(0);
        }

        let mut marked = 0;
        for candidate in &candidates {
            match self.mark_overdue(candidate, now).await {
                Ok(true) => marked += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        phase_id = candidate.phase_id,
                        journey_id = candidate.journey_id,
                        "Failed to mark phase overdue"
                    );
                }
            }
        }

        tracing::info!(candidates = candidates.len(), marked, "Overdue sweep finished");
        Ok(marked)
    }

    /// Mark one candidate under its journey's lock. Returns `false` when the
    /// journey was paused or the phase moved on since the candidate query.
    async fn mark_overdue(&self, candidate: &OverdueCandidate, now: Timestamp) -> EngineResult<bool> {
        let mut tx = self.pool.begin().await?;
        let journey = lock_journey(&mut tx, candidate.journey_id).await?;
        if journey.status()? != JourneyStatus::InProgress {
            return Ok(false);
        }
        if !PhaseRepo::mark_overdue(&mut tx, candidate.phase_id).await? {
            return Ok(false);
        }

        let phase = reload_phase(&mut tx, candidate.phase_id).await?;
        let mut recorder = ActivityRecorder::new();
        recorder
            .record(
                &mut tx,
                journey.user_id,
                phase.mentor_id,
                CreateActivity::new(
                    journey.id,
                    ActivityType::PhaseOverdue,
                    format!("Phase {} overdue: {}", phase.phase_number, phase.title),
                    now,
                )
                .with_phase(phase.phase_number)
                .with_metadata(json!({
                    "phase_id": phase.id,
                    "due_date": candidate.due_date,
                    "detected_at": now,
                })),
            )
            .await?;

        tx.commit().await?;
        recorder.publish(&self.event_bus);

        tracing::warn!(
            journey_id = journey.id,
            phase_number = phase.phase_number,
            due_date = %candidate.due_date,
            "Phase overdue"
        );
        Ok(true)
    }
}
