//! Journey activity log models. Activities are immutable (no `updated_at`).

use serde::Serialize;
use sqlx::FromRow;
use skill_loop_core::activity::ActivityType;
use skill_loop_core::types::{DbId, Timestamp};

/// A row from the `journey_activities` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JourneyActivity {
    pub id: DbId,
    pub journey_id: DbId,
    pub phase_number: Option<i32>,
    pub activity_type: String,
    pub title: String,
    pub description: Option<String>,
    pub metadata: serde_json::Value,
    pub actor_user_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// Input for appending an activity.
#[derive(Debug, Clone)]
pub struct CreateActivity {
    pub journey_id: DbId,
    pub phase_number: Option<i32>,
    pub activity_type: ActivityType,
    pub title: String,
    pub description: Option<String>,
    pub metadata: serde_json::Value,
    pub actor_user_id: Option<DbId>,
    pub created_at: Timestamp,
}

impl CreateActivity {
    /// Start a journey-level activity with an empty metadata object.
    pub fn new(
        journey_id: DbId,
        activity_type: ActivityType,
        title: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            journey_id,
            phase_number: None,
            activity_type,
            title: title.into(),
            description: None,
            metadata: serde_json::Value::Object(Default::default()),
            actor_user_id: None,
            created_at,
        }
    }

    pub fn with_phase(mut self, phase_number: i32) -> Self {
        self.phase_number = Some(phase_number);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_actor(mut self, actor: Option<DbId>) -> Self {
        self.actor_user_id = actor;
        self
    }
}
