//! User rows as seen by the journey engine.
//!
//! Users belong to the identity subsystem. The engine only reads identity
//! columns and writes the journey projection (`employee_category`,
//! `journey_status`, `current_phase_id`).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use skill_loop_core::types::{DbId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub employee_category: Option<String>,
    pub journey_status: Option<String>,
    pub current_phase_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for creating a user (seeding and tests).
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub display_name: String,
    pub role: Option<String>,
}
