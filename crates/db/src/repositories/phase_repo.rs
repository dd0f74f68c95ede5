//! Repository for the `journey_phases` table.

use sqlx::{PgConnection, PgExecutor};
use skill_loop_core::journey::{JourneyStatus, PhaseStatus};
use skill_loop_core::types::{DbId, Timestamp};

use crate::models::phase::{CreatePhase, JourneyPhase, OverdueCandidate, UpdatePhase};

/// Column list for journey_phases queries.
const COLUMNS: &str = "id, journey_id, phase_number, phase_type, title, description, \
    duration_days, status, started_at, due_date, completed_at, mentor_id, \
    assessment_id, training_assignment_id, created_at, updated_at";

/// Provides CRUD operations for journey phases.
pub struct PhaseRepo;

impl PhaseRepo {
    /// Insert a phase for a journey, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        journey_id: DbId,
        input: &CreatePhase,
    ) -> Result<JourneyPhase, sqlx::Error> {
        let query = format!(
            "INSERT INTO journey_phases
                (journey_id, phase_number, phase_type, title, description,
                 duration_days, status, started_at, due_date, mentor_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, JourneyPhase>(&query)
            .bind(journey_id)
            .bind(input.phase_number)
            .bind(input.phase_type.as_str())
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.duration_days)
            .bind(input.status.as_str())
            .bind(input.started_at)
            .bind(input.due_date)
            .bind(input.mentor_id)
            .fetch_one(conn)
            .await
    }

    /// Find a phase by its primary key.
    pub async fn find_by_id<'e, E>(
        executor: E,
        id: DbId,
    ) -> Result<Option<JourneyPhase>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM journey_phases WHERE id = $1");
        sqlx::query_as::<_, JourneyPhase>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// All phases of a journey, ordered by phase number.
    pub async fn list_by_journey<'e, E>(
        executor: E,
        journey_id: DbId,
    ) -> Result<Vec<JourneyPhase>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM journey_phases
             WHERE journey_id = $1
             ORDER BY phase_number ASC"
        );
        sqlx::query_as::<_, JourneyPhase>(&query)
            .bind(journey_id)
            .fetch_all(executor)
            .await
    }

    /// Same as [`list_by_journey`](Self::list_by_journey), locking the rows.
    pub async fn lock_by_journey(
        conn: &mut PgConnection,
        journey_id: DbId,
    ) -> Result<Vec<JourneyPhase>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM journey_phases
             WHERE journey_id = $1
             ORDER BY phase_number ASC
             FOR UPDATE"
        );
        sqlx::query_as::<_, JourneyPhase>(&query)
            .bind(journey_id)
            .fetch_all(conn)
            .await
    }

    /// Mark a phase completed.
    pub async fn mark_completed(
        conn: &mut PgConnection,
        id: DbId,
        completed_at: Timestamp,
    ) -> Result<JourneyPhase, sqlx::Error> {
        let query = format!(
            "UPDATE journey_phases SET status = $2, completed_at = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, JourneyPhase>(&query)
            .bind(id)
            .bind(PhaseStatus::Completed.as_str())
            .bind(completed_at)
            .fetch_one(conn)
            .await
    }

    /// Mark a phase started. The due date is left untouched.
    pub async fn mark_started(
        conn: &mut PgConnection,
        id: DbId,
        started_at: Timestamp,
    ) -> Result<JourneyPhase, sqlx::Error> {
        let query = format!(
            "UPDATE journey_phases SET status = $2, started_at = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, JourneyPhase>(&query)
            .bind(id)
            .bind(PhaseStatus::InProgress.as_str())
            .bind(started_at)
            .fetch_one(conn)
            .await
    }

    /// Flag an `in_progress` phase as overdue.
    ///
    /// Conditional on the current status, so a phase that was completed or
    /// already flagged in the meantime is left alone. Returns `true` when
    /// the row changed.
    pub async fn mark_overdue(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE journey_phases SET status = $2
             WHERE id = $1 AND status = $3",
        )
        .bind(id)
        .bind(PhaseStatus::Overdue.as_str())
        .bind(PhaseStatus::InProgress.as_str())
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// `in_progress` phases past their due date whose journey is running.
    /// Phases of paused journeys are not returned.
    pub async fn list_overdue_candidates<'e, E>(
        executor: E,
        now: Timestamp,
    ) -> Result<Vec<OverdueCandidate>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, OverdueCandidate>(
            "SELECT p.id AS phase_id, p.journey_id, p.phase_number, p.due_date
             FROM journey_phases p
             JOIN journeys j ON j.id = p.journey_id
             WHERE p.status = $1
               AND p.due_date < $2
               AND j.status = $3
             ORDER BY p.due_date ASC, p.id ASC",
        )
        .bind(PhaseStatus::InProgress.as_str())
        .bind(now)
        .bind(JourneyStatus::InProgress.as_str())
        .fetch_all(executor)
        .await
    }

    /// Link an assessment to a phase.
    pub async fn set_assessment(
        conn: &mut PgConnection,
        id: DbId,
        assessment_id: DbId,
    ) -> Result<JourneyPhase, sqlx::Error> {
        let query = format!(
            "UPDATE journey_phases SET assessment_id = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, JourneyPhase>(&query)
            .bind(id)
            .bind(assessment_id)
            .fetch_one(conn)
            .await
    }

    /// Link a training assignment to a phase.
    pub async fn set_training_assignment(
        conn: &mut PgConnection,
        id: DbId,
        training_assignment_id: DbId,
    ) -> Result<JourneyPhase, sqlx::Error> {
        let query = format!(
            "UPDATE journey_phases SET training_assignment_id = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, JourneyPhase>(&query)
            .bind(id)
            .bind(training_assignment_id)
            .fetch_one(conn)
            .await
    }

    /// Set or clear a phase's mentor.
    pub async fn set_mentor(
        conn: &mut PgConnection,
        id: DbId,
        mentor_id: Option<DbId>,
    ) -> Result<JourneyPhase, sqlx::Error> {
        let query = format!(
            "UPDATE journey_phases SET mentor_id = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, JourneyPhase>(&query)
            .bind(id)
            .bind(mentor_id)
            .fetch_one(conn)
            .await
    }

    /// Patch phase metadata. `due_date` is deliberately not touched.
    pub async fn update_details(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdatePhase,
    ) -> Result<JourneyPhase, sqlx::Error> {
        let query = format!(
            "UPDATE journey_phases SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                duration_days = COALESCE($4, duration_days)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, JourneyPhase>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.duration_days)
            .fetch_one(conn)
            .await
    }
}
