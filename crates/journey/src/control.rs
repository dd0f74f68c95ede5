//! Administrative journey and phase operations: pause, resume, linking
//! assessments and training, editing phase details, and mentor assignment.

use chrono::Utc;
use serde_json::json;
use skill_loop_core::activity::ActivityType;
use skill_loop_core::journey::{JourneyStatus, PhaseStatus};
use skill_loop_core::phase_config::{validate_description, validate_duration_days, validate_title};
use skill_loop_core::types::{DbId, Timestamp};
use skill_loop_db::models::activity::CreateActivity;
use skill_loop_db::models::journey::Journey;
use skill_loop_db::models::phase::{JourneyPhase, UpdatePhase};
use skill_loop_db::repositories::{JourneyRepo, PhaseRepo, UserRepo};
use sqlx::PgConnection;

use crate::engine::{journey_of_phase, lock_journey, reload_phase, JourneyEngine};
use crate::error::{EngineError, EngineResult};
use crate::recorder::ActivityRecorder;

impl JourneyEngine {
    // -----------------------------------------------------------------------
    // Pause / resume
    // -----------------------------------------------------------------------

    /// Suspend a journey. Phases keep their state and due dates; overdue
    /// detection skips the journey until it is resumed.
    pub async fn pause_journey(
        &self,
        journey_id: DbId,
        reason: Option<String>,
        actor_user_id: Option<DbId>,
    ) -> EngineResult<Journey> {
        self.pause_journey_at(journey_id, reason, actor_user_id, Utc::now())
            .await
    }

    pub async fn pause_journey_at(
        &self,
        journey_id: DbId,
        reason: Option<String>,
        actor_user_id: Option<DbId>,
        now: Timestamp,
    ) -> EngineResult<Journey> {
        let metadata = json!({ "reason": reason });
        let mut activity =
            CreateActivity::new(journey_id, ActivityType::JourneyPaused, "Journey paused", now)
                .with_metadata(metadata)
                .with_actor(actor_user_id);
        if let Some(reason) = reason {
            activity = activity.with_description(reason);
        }
        self.set_journey_status(journey_id, JourneyStatus::Paused, activity).await
    }

    /// Return a paused journey to `in_progress`. Due dates are not shifted.
    pub async fn resume_journey(
        &self,
        journey_id: DbId,
        actor_user_id: Option<DbId>,
    ) -> EngineResult<Journey> {
        self.resume_journey_at(journey_id, actor_user_id, Utc::now())
            .await
    }

    pub async fn resume_journey_at(
        &self,
        journey_id: DbId,
        actor_user_id: Option<DbId>,
        now: Timestamp,
    ) -> EngineResult<Journey> {
        let activity =
            CreateActivity::new(journey_id, ActivityType::JourneyResumed, "Journey resumed", now)
                .with_actor(actor_user_id);
        self.set_journey_status(journey_id, JourneyStatus::InProgress, activity).await
    }

    async fn set_journey_status(
        &self,
        journey_id: DbId,
        target: JourneyStatus,
        activity: CreateActivity,
    ) -> EngineResult<Journey> {
        let mut tx = self.pool.begin().await?;
        let journey = lock_journey(&mut tx, journey_id).await?;
        journey.status()?.validate_transition(target)?;

        let updated = JourneyRepo::update_status(&mut tx, journey_id, target, None).await?;
        UserRepo::set_journey_status(&mut tx, journey.user_id, target).await?;

        let mut recorder = ActivityRecorder::new();
        recorder.record(&mut tx, journey.user_id, None, activity).await?;

        tx.commit().await?;
        recorder.publish(&self.event_bus);

        tracing::info!(journey_id, status = %target, "Journey status changed");
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Linking
    // -----------------------------------------------------------------------

    /// Attach an assessment to a phase so its completion can advance it.
    pub async fn link_assessment_to_phase(
        &self,
        phase_id: DbId,
        assessment_id: DbId,
        actor_user_id: Option<DbId>,
    ) -> EngineResult<JourneyPhase> {
        self.edit_phase(phase_id, PhaseEdit::LinkAssessment(assessment_id), actor_user_id)
            .await
    }

    /// Attach a training assignment to a phase.
    pub async fn link_training_to_phase(
        &self,
        phase_id: DbId,
        training_assignment_id: DbId,
        actor_user_id: Option<DbId>,
    ) -> EngineResult<JourneyPhase> {
        self.edit_phase(
            phase_id,
            PhaseEdit::LinkTraining(training_assignment_id),
            actor_user_id,
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Phase details and mentors
    // -----------------------------------------------------------------------

    /// Edit a phase's title, description or duration. The due date is
    /// fixed at creation and does not move.
    pub async fn update_phase(
        &self,
        phase_id: DbId,
        input: UpdatePhase,
        actor_user_id: Option<DbId>,
    ) -> EngineResult<JourneyPhase> {
        if input.is_empty() {
            return Err(EngineError::validation("No phase fields to update"));
        }
        if let Some(title) = &input.title {
            validate_title(title)?;
        }
        if let Some(description) = &input.description {
            validate_description(description)?;
        }
        if let Some(days) = input.duration_days {
            validate_duration_days(days)?;
        }

        self.edit_phase(phase_id, PhaseEdit::Details(input), actor_user_id)
            .await
    }

    /// Assign (or replace) a phase's mentor.
    pub async fn assign_mentor(
        &self,
        phase_id: DbId,
        mentor_id: DbId,
        actor_user_id: Option<DbId>,
    ) -> EngineResult<JourneyPhase> {
        if UserRepo::find_by_id(&self.pool, mentor_id).await?.is_none() {
            return Err(EngineError::not_found("User", mentor_id));
        }
        self.edit_phase(phase_id, PhaseEdit::AssignMentor(mentor_id), actor_user_id)
            .await
    }

    /// Clear a phase's mentor. A phase without one is a conflict.
    pub async fn remove_mentor(
        &self,
        phase_id: DbId,
        actor_user_id: Option<DbId>,
    ) -> EngineResult<JourneyPhase> {
        self.edit_phase(phase_id, PhaseEdit::RemoveMentor, actor_user_id)
            .await
    }

    /// Apply a single-phase edit under the journey lock and record it.
    async fn edit_phase(
        &self,
        phase_id: DbId,
        edit: PhaseEdit,
        actor_user_id: Option<DbId>,
    ) -> EngineResult<JourneyPhase> {
        let now = Utc::now();
        let journey_id = journey_of_phase(&self.pool, phase_id).await?;

        let mut tx = self.pool.begin().await?;
        let journey = lock_journey(&mut tx, journey_id).await?;
        let phase = reload_phase(&mut tx, phase_id).await?;

        let (updated, activity) = apply_edit(&mut tx, &phase, edit, now).await?;

        let mut recorder = ActivityRecorder::new();
        recorder
            .record(
                &mut tx,
                journey.user_id,
                updated.mentor_id,
                activity
                    .with_phase(phase.phase_number)
                    .with_actor(actor_user_id),
            )
            .await?;

        tx.commit().await?;
        recorder.publish(&self.event_bus);

        tracing::info!(journey_id, phase_id, "Phase edited");
        Ok(updated)
    }
}

// ---------------------------------------------------------------------------
// Phase edits
// ---------------------------------------------------------------------------

enum PhaseEdit {
    LinkAssessment(DbId),
    LinkTraining(DbId),
    Details(UpdatePhase),
    AssignMentor(DbId),
    RemoveMentor,
}

async fn apply_edit(
    conn: &mut PgConnection,
    phase: &JourneyPhase,
    edit: PhaseEdit,
    now: Timestamp,
) -> EngineResult<(JourneyPhase, CreateActivity)> {
    let n = phase.phase_number;
    let (updated, activity_type, title, metadata) = match edit {
        PhaseEdit::LinkAssessment(assessment_id) => {
            ensure_not_completed(phase, "link an assessment to")?;
            (
                PhaseRepo::set_assessment(conn, phase.id, assessment_id).await?,
                ActivityType::AssessmentLinked,
                format!("Assessment linked to phase {n}"),
                json!({ "phase_id": phase.id, "assessment_id": assessment_id }),
            )
        }
        PhaseEdit::LinkTraining(training_assignment_id) => {
            ensure_not_completed(phase, "link training to")?;
            (
                PhaseRepo::set_training_assignment(conn, phase.id, training_assignment_id).await?,
                ActivityType::TrainingLinked,
                format!("Training linked to phase {n}"),
                json!({ "phase_id": phase.id, "training_assignment_id": training_assignment_id }),
            )
        }
        PhaseEdit::Details(input) => {
            ensure_not_completed(phase, "edit")?;
            (
                PhaseRepo::update_details(conn, phase.id, &input).await?,
                ActivityType::PhaseUpdated,
                format!("Phase {n} updated"),
                json!({
                    "phase_id": phase.id,
                    "title": input.title,
                    "description": input.description,
                    "duration_days": input.duration_days,
                }),
            )
        }
        PhaseEdit::AssignMentor(mentor_id) => (
            PhaseRepo::set_mentor(conn, phase.id, Some(mentor_id)).await?,
            ActivityType::MentorAssigned,
            format!("Mentor assigned to phase {n}"),
            json!({
                "phase_id": phase.id,
                "mentor_id": mentor_id,
                "previous_mentor_id": phase.mentor_id,
            }),
        ),
        PhaseEdit::RemoveMentor => {
            let Some(previous) = phase.mentor_id else {
                return Err(EngineError::conflict(format!("Phase {} has no mentor", phase.id)));
            };
            (
                PhaseRepo::set_mentor(conn, phase.id, None).await?,
                ActivityType::MentorRemoved,
                format!("Mentor removed from phase {n}"),
                json!({ "phase_id": phase.id, "mentor_id": previous }),
            )
        }
    };

    let activity =
        CreateActivity::new(phase.journey_id, activity_type, title, now).with_metadata(metadata);
    Ok((updated, activity))
}

fn ensure_not_completed(phase: &JourneyPhase, action: &str) -> EngineResult<()> {
    if phase.status()? == PhaseStatus::Completed {
        return Err(EngineError::validation(format!(
            "Cannot {action} phase {}: it is already completed",
            phase.id
        )));
    }
    Ok(())
}
