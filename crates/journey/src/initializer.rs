//! Journey creation.
//!
//! A new journey is laid out from a phase template: phase 1 starts
//! immediately, every later phase waits, and each due date is fixed at
//! creation from the cumulative durations.

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use skill_loop_core::activity::ActivityType;
use skill_loop_core::journey::{EmployeeCategory, JourneyStatus};
use skill_loop_core::phase_config::{default_template, schedule_phases, validate_phase_templates, PhaseTemplate};
use skill_loop_core::types::{DbId, Timestamp};
use skill_loop_db::models::activity::CreateActivity;
use skill_loop_db::models::journey::{CreateJourney, Journey};
use skill_loop_db::models::phase::{CreatePhase, JourneyPhase};
use skill_loop_db::repositories::{JourneyRepo, PhaseRepo, UserRepo};
use sqlx::PgConnection;

use crate::engine::JourneyEngine;
use crate::error::{EngineError, EngineResult};
use crate::recorder::ActivityRecorder;

/// Request to start a journey for a user.
#[derive(Debug, Clone, Deserialize)]
pub struct InitializeJourney {
    pub user_id: DbId,
    pub employee_category: EmployeeCategory,
    /// Custom phases; the category's default template when absent.
    #[serde(default)]
    pub phases: Option<Vec<PhaseTemplate>>,
    /// Start of phase 1; the time of the call when absent.
    #[serde(default)]
    pub start_date: Option<Timestamp>,
    /// Administrator starting the journey, recorded on the activity.
    #[serde(skip)]
    pub actor_user_id: Option<DbId>,
}

impl InitializeJourney {
    pub fn new(user_id: DbId, employee_category: EmployeeCategory) -> Self {
        Self {
            user_id,
            employee_category,
            phases: None,
            start_date: None,
            actor_user_id: None,
        }
    }

    pub fn with_phases(mut self, phases: Vec<PhaseTemplate>) -> Self {
        self.phases = Some(phases);
        self
    }

    pub fn with_start_date(mut self, start_date: Timestamp) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn with_actor(mut self, actor_user_id: Option<DbId>) -> Self {
        self.actor_user_id = actor_user_id;
        self
    }
}

/// Everything needed to write one journey cycle.
pub(crate) struct NewCycle<'a> {
    pub user_id: DbId,
    pub category: EmployeeCategory,
    pub phases: &'a [PhaseTemplate],
    pub start: Timestamp,
    pub cycle_number: i32,
    pub renewed_from: Option<DbId>,
    pub actor_user_id: Option<DbId>,
}

impl JourneyEngine {
    /// Start a journey and return its id.
    pub async fn initialize_journey(&self, input: InitializeJourney) -> EngineResult<DbId> {
        self.initialize_journey_at(input, Utc::now()).await
    }

    /// [`initialize_journey`](Self::initialize_journey) with an explicit
    /// clock, used as the activity timestamp and the default start date.
    pub async fn initialize_journey_at(
        &self,
        input: InitializeJourney,
        now: Timestamp,
    ) -> EngineResult<DbId> {
        let phases = input
            .phases
            .unwrap_or_else(|| default_template(input.employee_category));
        validate_phase_templates(&phases)?;

        let mut tx = self.pool.begin().await?;

        if UserRepo::find_by_id(&mut *tx, input.user_id).await?.is_none() {
            return Err(EngineError::not_found("User", input.user_id));
        }
        if let Some(open) = JourneyRepo::find_open_for_user(&mut *tx, input.user_id).await? {
            return Err(EngineError::conflict(format!(
                "User {} already has an open journey ({})",
                input.user_id, open.id
            )));
        }

        let mut recorder = ActivityRecorder::new();
        let (journey, phase_rows) = create_cycle(
            &mut tx,
            &mut recorder,
            NewCycle {
                user_id: input.user_id,
                category: input.employee_category,
                phases: &phases,
                start: input.start_date.unwrap_or(now),
                cycle_number: 1,
                renewed_from: None,
                actor_user_id: input.actor_user_id,
            },
            now,
        )
        .await?;

        tx.commit().await?;
        recorder.publish(&self.event_bus);

        tracing::info!(
            journey_id = journey.id,
            user_id = journey.user_id,
            category = %input.employee_category,
            phases = phase_rows.len(),
            "Journey initialized"
        );
        Ok(journey.id)
    }
}

/// Write a journey, its phases, the owner's projection, and the
/// `JOURNEY_STARTED` activity. Runs inside the caller's transaction.
pub(crate) async fn create_cycle(
    conn: &mut PgConnection,
    recorder: &mut ActivityRecorder,
    cycle: NewCycle<'_>,
    now: Timestamp,
) -> EngineResult<(Journey, Vec<JourneyPhase>)> {
    let journey = JourneyRepo::create(
        &mut *conn,
        &CreateJourney {
            user_id: cycle.user_id,
            employee_category: cycle.category,
            status: JourneyStatus::InProgress,
            cycle_number: cycle.cycle_number,
            started_at: cycle.start,
        },
    )
    .await?;

    let mut rows = Vec::with_capacity(cycle.phases.len());
    for scheduled in schedule_phases(cycle.start, cycle.phases) {
        let row = PhaseRepo::create(&mut *conn, journey.id, &CreatePhase::from(scheduled)).await?;
        rows.push(row);
    }

    let first = rows
        .first()
        .ok_or_else(|| EngineError::validation("A journey needs at least one phase"))?;

    UserRepo::set_journey_projection(
        &mut *conn,
        cycle.user_id,
        cycle.category,
        JourneyStatus::InProgress,
        Some(first.id),
    )
    .await?;

    let title = if cycle.renewed_from.is_some() {
        format!("Journey cycle {} started", cycle.cycle_number)
    } else {
        "Journey started".to_string()
    };
    let metadata = json!({
        "employee_category": cycle.category,
        "cycle_number": cycle.cycle_number,
        "phase_count": rows.len(),
        "start_date": cycle.start,
        "renewed_from": cycle.renewed_from,
    });
    recorder
        .record(
            &mut *conn,
            cycle.user_id,
            first.mentor_id,
            CreateActivity::new(journey.id, ActivityType::JourneyStarted, title, now)
                .with_phase(first.phase_number)
                .with_metadata(metadata)
                .with_actor(cycle.actor_user_id),
        )
        .await?;

    Ok((journey, rows))
}

/// The next cycle of a recurring journey that has just completed.
pub(crate) async fn renew_cycle(
    conn: &mut PgConnection,
    recorder: &mut ActivityRecorder,
    completed: &Journey,
    category: EmployeeCategory,
    now: Timestamp,
) -> EngineResult<Journey> {
    let template = default_template(category);
    let (journey, _) = create_cycle(
        conn,
        recorder,
        NewCycle {
            user_id: completed.user_id,
            category,
            phases: &template,
            start: now,
            cycle_number: completed.cycle_number + 1,
            renewed_from: Some(completed.id),
            actor_user_id: None,
        },
        now,
    )
    .await?;

    tracing::info!(
        previous_journey_id = completed.id,
        journey_id = journey.id,
        cycle_number = journey.cycle_number,
        "Recurring journey renewed"
    );
    Ok(journey)
}
