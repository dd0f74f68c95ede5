//! Phase transitions: completing the active phase and moving the journey
//! forward.
//!
//! Both entry points lock the journey row, lock its phases, ask
//! [`plan_advance`] what to do, and apply the plan in one transaction.
//! Completing the last phase completes the journey; for recurring employees
//! the next cycle is created in the same transaction.

use chrono::Utc;
use serde_json::json;
use skill_loop_core::activity::{ActivityType, TriggerReason};
use skill_loop_core::advance::{find_active_phase, plan_advance, AdvancePlan, PhaseSnapshot};
use skill_loop_core::journey::JourneyStatus;
use skill_loop_core::types::{DbId, Timestamp};
use skill_loop_db::models::activity::CreateActivity;
use skill_loop_db::models::journey::Journey;
use skill_loop_db::repositories::{JourneyRepo, PhaseRepo, UserRepo};
use sqlx::PgConnection;

use crate::engine::{journey_of_phase, lock_journey, JourneyEngine};
use crate::error::{EngineError, EngineResult};
use crate::initializer::renew_cycle;
use crate::recorder::ActivityRecorder;

impl JourneyEngine {
    /// Complete the journey's active phase and activate the next one.
    ///
    /// Returns `Ok(false)` without writing anything when the journey has no
    /// active phase (for instance because it already completed), or when the
    /// trigger names an assessment or training assignment that is not linked
    /// to the active phase. Repeated or racing triggers for the same event
    /// therefore advance at most once. A paused journey is a conflict.
    pub async fn auto_advance_phase(
        &self,
        journey_id: DbId,
        trigger: TriggerReason,
        metadata: Option<serde_json::Value>,
    ) -> EngineResult<bool> {
        self.auto_advance_phase_at(journey_id, trigger, metadata, Utc::now())
            .await
    }

    pub async fn auto_advance_phase_at(
        &self,
        journey_id: DbId,
        trigger: TriggerReason,
        metadata: Option<serde_json::Value>,
        now: Timestamp,
    ) -> EngineResult<bool> {
        let mut tx = self.pool.begin().await?;
        let journey = lock_journey(&mut tx, journey_id).await?;

        let mut recorder = ActivityRecorder::new();
        let advanced = advance_locked(
            &mut tx,
            &mut recorder,
            &journey,
            None,
            &trigger,
            metadata.as_ref(),
            now,
        )
        .await?;
        if !advanced {
            return Ok(false);
        }

        tx.commit().await?;
        recorder.publish(&self.event_bus);
        Ok(true)
    }

    /// Administrator override: complete a specific phase, which must be the
    /// journey's active one, and advance as if it had been triggered.
    pub async fn manually_complete_phase(
        &self,
        phase_id: DbId,
        completed_by: DbId,
        notes: Option<String>,
    ) -> EngineResult<bool> {
        self.manually_complete_phase_at(phase_id, completed_by, notes, Utc::now())
            .await
    }

    pub async fn manually_complete_phase_at(
        &self,
        phase_id: DbId,
        completed_by: DbId,
        notes: Option<String>,
        now: Timestamp,
    ) -> EngineResult<bool> {
        let journey_id = journey_of_phase(&self.pool, phase_id).await?;

        let mut tx = self.pool.begin().await?;
        let journey = lock_journey(&mut tx, journey_id).await?;

        let trigger = TriggerReason::ManualOverride {
            by: completed_by,
            notes,
        };
        let mut recorder = ActivityRecorder::new();
        let advanced = advance_locked(
            &mut tx,
            &mut recorder,
            &journey,
            Some(phase_id),
            &trigger,
            None,
            now,
        )
        .await?;
        if !advanced {
            return Ok(false);
        }

        tx.commit().await?;
        recorder.publish(&self.event_bus);

        tracing::info!(phase_id, journey_id, completed_by, "Phase manually completed");
        Ok(true)
    }
}

/// Apply one advance to a journey whose row is already locked.
///
/// When `expected_phase` is set, the advance only proceeds if that phase is
/// the active one.
async fn advance_locked(
    conn: &mut PgConnection,
    recorder: &mut ActivityRecorder,
    journey: &Journey,
    expected_phase: Option<DbId>,
    trigger: &TriggerReason,
    details: Option<&serde_json::Value>,
    now: Timestamp,
) -> EngineResult<bool> {
    match journey.status()? {
        JourneyStatus::InProgress => {}
        JourneyStatus::Completed if expected_phase.is_none() => return Ok(false),
        status => {
            return Err(EngineError::conflict(format!(
                "Journey {} is {status} and cannot advance",
                journey.id
            )))
        }
    }

    let rows = PhaseRepo::lock_by_journey(&mut *conn, journey.id).await?;
    let snapshots = rows
        .iter()
        .map(|row| row.snapshot())
        .collect::<Result<Vec<PhaseSnapshot>, _>>()?;

    if let Some(phase_id) = expected_phase {
        let active = find_active_phase(&snapshots)?;
        if active.map(|a| a.id) != Some(phase_id) {
            return Err(EngineError::conflict(format!(
                "Phase {phase_id} is not the active phase of journey {}",
                journey.id
            )));
        }
    }

    let Some(plan) = plan_advance(&snapshots)? else {
        tracing::warn!(journey_id = journey.id, trigger = %trigger.tag(), "No active phase, advance skipped");
        return Ok(false);
    };

    let active = rows
        .iter()
        .find(|row| row.id == plan.completed().id)
        .ok_or_else(|| EngineError::not_found("Phase", plan.completed().id))?;
    if !trigger.applies_to(active.assessment_id, active.training_assignment_id) {
        tracing::warn!(
            journey_id = journey.id,
            phase_number = active.phase_number,
            trigger = %trigger.tag(),
            "Trigger does not match the active phase, advance skipped"
        );
        return Ok(false);
    }

    // Complete first: the next phase may only become active once this one
    // no longer is.
    let completed = PhaseRepo::mark_completed(&mut *conn, plan.completed().id, now).await?;
    recorder
        .record(
            &mut *conn,
            journey.user_id,
            completed.mentor_id,
            CreateActivity::new(
                journey.id,
                ActivityType::PhaseAutoCompleted,
                format!("Phase {} completed: {}", completed.phase_number, completed.title),
                now,
            )
            .with_phase(completed.phase_number)
            .with_metadata(trigger.to_metadata(details))
            .with_actor(trigger.actor()),
        )
        .await?;

    match plan {
        AdvancePlan::ActivateNext { next, .. } => {
            let started = PhaseRepo::mark_started(&mut *conn, next.id, now).await?;
            UserRepo::set_current_phase(&mut *conn, journey.user_id, Some(started.id)).await?;
            recorder
                .record(
                    &mut *conn,
                    journey.user_id,
                    started.mentor_id,
                    CreateActivity::new(
                        journey.id,
                        ActivityType::PhaseStarted,
                        format!("Phase {} started: {}", started.phase_number, started.title),
                        now,
                    )
                    .with_phase(started.phase_number)
                    .with_metadata(json!({
                        "phase_id": started.id,
                        "due_date": started.due_date,
                        "previous_phase_number": completed.phase_number,
                    }))
                    .with_actor(trigger.actor()),
                )
                .await?;

            tracing::info!(
                journey_id = journey.id,
                completed_phase = completed.phase_number,
                started_phase = started.phase_number,
                trigger = %trigger.tag(),
                "Journey advanced"
            );
        }
        AdvancePlan::CompleteJourney { .. } => {
            complete_journey(conn, recorder, journey, trigger, now).await?;
        }
    }

    Ok(true)
}

async fn complete_journey(
    conn: &mut PgConnection,
    recorder: &mut ActivityRecorder,
    journey: &Journey,
    trigger: &TriggerReason,
    now: Timestamp,
) -> EngineResult<()> {
    journey.status()?.validate_transition(JourneyStatus::Completed)?;

    let completed = JourneyRepo::update_status(&mut *conn, journey.id, JourneyStatus::Completed, Some(now)).await?;
    UserRepo::set_journey_status(&mut *conn, journey.user_id, JourneyStatus::Completed).await?;
    UserRepo::set_current_phase(&mut *conn, journey.user_id, None).await?;

    recorder
        .record(
            &mut *conn,
            journey.user_id,
            None,
            CreateActivity::new(journey.id, ActivityType::JourneyCompleted, "Journey completed", now)
                .with_metadata(json!({
                    "cycle_number": completed.cycle_number,
                    "triggered_by": trigger.tag(),
                }))
                .with_actor(trigger.actor()),
        )
        .await?;

    tracing::info!(
        journey_id = journey.id,
        user_id = journey.user_id,
        cycle_number = completed.cycle_number,
        "Journey completed"
    );

    let category = completed.category()?;
    if category.renews_on_completion() {
        renew_cycle(conn, recorder, &completed, category, now).await?;
    }
    Ok(())
}
