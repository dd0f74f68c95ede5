//! Journey phase models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use skill_loop_core::advance::PhaseSnapshot;
use skill_loop_core::error::CoreError;
use skill_loop_core::journey::{PhaseStatus, PhaseType};
use skill_loop_core::phase_config::ScheduledPhase;
use skill_loop_core::progress::ProgressPhase;
use skill_loop_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `journey_phases` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JourneyPhase {
    pub id: DbId,
    pub journey_id: DbId,
    pub phase_number: i32,
    pub phase_type: String,
    pub title: String,
    pub description: Option<String>,
    pub duration_days: i32,
    pub status: String,
    pub started_at: Option<Timestamp>,
    pub due_date: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub mentor_id: Option<DbId>,
    pub assessment_id: Option<DbId>,
    pub training_assignment_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl JourneyPhase {
    pub fn status(&self) -> Result<PhaseStatus, CoreError> {
        PhaseStatus::from_str_db(&self.status)
    }

    pub fn phase_type(&self) -> Result<PhaseType, CoreError> {
        PhaseType::from_str_db(&self.phase_type)
    }

    /// Planner view of this row.
    pub fn snapshot(&self) -> Result<PhaseSnapshot, CoreError> {
        Ok(PhaseSnapshot {
            id: self.id,
            phase_number: self.phase_number,
            status: self.status()?,
        })
    }

    /// Progress view of this row.
    pub fn progress_view(&self) -> Result<ProgressPhase, CoreError> {
        Ok(ProgressPhase {
            phase_number: self.phase_number,
            status: self.status()?,
            due_date: self.due_date,
        })
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for inserting a phase row, built from a [`ScheduledPhase`].
#[derive(Debug, Clone)]
pub struct CreatePhase {
    pub phase_number: i32,
    pub phase_type: PhaseType,
    pub title: String,
    pub description: Option<String>,
    pub duration_days: i32,
    pub status: PhaseStatus,
    pub started_at: Option<Timestamp>,
    pub due_date: Timestamp,
    pub mentor_id: Option<DbId>,
}

impl From<ScheduledPhase> for CreatePhase {
    fn from(s: ScheduledPhase) -> Self {
        Self {
            phase_number: s.phase_number,
            phase_type: s.template.phase_type,
            title: s.template.title,
            description: s.template.description,
            duration_days: s.template.duration_days,
            status: s.status,
            started_at: s.started_at,
            due_date: s.due_date,
            mentor_id: s.template.mentor_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Update DTO
// ---------------------------------------------------------------------------

/// Editable phase metadata (all fields optional). The schedule is not
/// editable: changing `duration_days` never moves `due_date`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePhase {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_days: Option<i32>,
}

impl UpdatePhase {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.duration_days.is_none()
    }
}

// ---------------------------------------------------------------------------
// Query rows
// ---------------------------------------------------------------------------

/// An active phase past its due date, as found by the overdue sweep.
#[derive(Debug, Clone, FromRow)]
pub struct OverdueCandidate {
    pub phase_id: DbId,
    pub journey_id: DbId,
    pub phase_number: i32,
    pub due_date: Timestamp,
}
