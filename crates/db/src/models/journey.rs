//! Journey models.
//!
//! A journey is one employee's onboarding or development cycle. Its phases
//! and activities live in their own tables and are owned by it.

use serde::Serialize;
use sqlx::FromRow;
use skill_loop_core::error::CoreError;
use skill_loop_core::journey::{EmployeeCategory, JourneyStatus};
use skill_loop_core::types::{DbId, Timestamp};

use crate::models::phase::JourneyPhase;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `journeys` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Journey {
    pub id: DbId,
    pub user_id: DbId,
    pub employee_category: String,
    pub status: String,
    pub cycle_number: i32,
    pub started_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Journey {
    pub fn status(&self) -> Result<JourneyStatus, CoreError> {
        JourneyStatus::from_str_db(&self.status)
    }

    pub fn category(&self) -> Result<EmployeeCategory, CoreError> {
        EmployeeCategory::from_str_db(&self.employee_category)
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for inserting a journey row.
#[derive(Debug, Clone)]
pub struct CreateJourney {
    pub user_id: DbId,
    pub employee_category: EmployeeCategory,
    pub status: JourneyStatus,
    pub cycle_number: i32,
    pub started_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A journey together with its phases, ordered by phase number.
#[derive(Debug, Clone, Serialize)]
pub struct JourneyDetail {
    #[serde(flatten)]
    pub journey: Journey,
    pub phases: Vec<JourneyPhase>,
}
