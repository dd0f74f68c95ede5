//! Activity log vocabulary: activity kinds and phase-transition triggers.
//!
//! Activities are the append-only audit trail of a journey. Every mutating
//! engine operation records exactly the activities listed on its variant
//! below, in the same transaction as the state change.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Activity type
// ---------------------------------------------------------------------------

/// Kind of a journey activity log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    JourneyStarted,
    JourneyCompleted,
    JourneyPaused,
    JourneyResumed,
    PhaseStarted,
    PhaseAutoCompleted,
    PhaseOverdue,
    PhaseUpdated,
    AssessmentLinked,
    TrainingLinked,
    MentorAssigned,
    MentorRemoved,
}

impl ActivityType {
    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JourneyStarted => "JOURNEY_STARTED",
            Self::JourneyCompleted => "JOURNEY_COMPLETED",
            Self::JourneyPaused => "JOURNEY_PAUSED",
            Self::JourneyResumed => "JOURNEY_RESUMED",
            Self::PhaseStarted => "PHASE_STARTED",
            Self::PhaseAutoCompleted => "PHASE_AUTO_COMPLETED",
            Self::PhaseOverdue => "PHASE_OVERDUE",
            Self::PhaseUpdated => "PHASE_UPDATED",
            Self::AssessmentLinked => "ASSESSMENT_LINKED",
            Self::TrainingLinked => "TRAINING_LINKED",
            Self::MentorAssigned => "MENTOR_ASSIGNED",
            Self::MentorRemoved => "MENTOR_REMOVED",
        }
    }

    /// Parse an activity type string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "JOURNEY_STARTED" => Ok(Self::JourneyStarted),
            "JOURNEY_COMPLETED" => Ok(Self::JourneyCompleted),
            "JOURNEY_PAUSED" => Ok(Self::JourneyPaused),
            "JOURNEY_RESUMED" => Ok(Self::JourneyResumed),
            "PHASE_STARTED" => Ok(Self::PhaseStarted),
            "PHASE_AUTO_COMPLETED" => Ok(Self::PhaseAutoCompleted),
            "PHASE_OVERDUE" => Ok(Self::PhaseOverdue),
            "PHASE_UPDATED" => Ok(Self::PhaseUpdated),
            "ASSESSMENT_LINKED" => Ok(Self::AssessmentLinked),
            "TRAINING_LINKED" => Ok(Self::TrainingLinked),
            "MENTOR_ASSIGNED" => Ok(Self::MentorAssigned),
            "MENTOR_REMOVED" => Ok(Self::MentorRemoved),
            _ => Err(CoreError::Validation(format!(
                "Invalid activity type '{s}'"
            ))),
        }
    }

    /// Whether the owner (and mentor, if any) should be alerted.
    pub fn needs_notification(&self) -> bool {
        matches!(
            self,
            Self::PhaseOverdue | Self::JourneyCompleted | Self::PhaseStarted
        )
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Trigger reason
// ---------------------------------------------------------------------------

/// The external event that caused a phase to be completed.
///
/// Stored as structured JSON on the `PHASE_AUTO_COMPLETED` activity under
/// the `"trigger"` key, next to the flat [`tag`](TriggerReason::tag) under
/// `"triggered_by"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerReason {
    /// A linked assessment attempt was completed.
    AssessmentCompleted { assessment_id: Option<DbId> },
    /// A linked training assignment reached `COMPLETED`.
    TrainingCompleted { training_assignment_id: Option<DbId> },
    /// An administrator completed the phase by hand.
    ManualOverride { by: DbId, notes: Option<String> },
    /// Internal or scripted advancement.
    System,
}

impl TriggerReason {
    /// Flat audit tag, e.g. `"assessment_completion"` or
    /// `"manual_completion_by_42"`.
    pub fn tag(&self) -> String {
        match self {
            Self::AssessmentCompleted { .. } => "assessment_completion".to_string(),
            Self::TrainingCompleted { .. } => "training_completion".to_string(),
            Self::ManualOverride { by, .. } => format!("manual_completion_by_{by}"),
            Self::System => "system".to_string(),
        }
    }

    /// The user who caused the transition, when there is one.
    pub fn actor(&self) -> Option<DbId> {
        match self {
            Self::ManualOverride { by, .. } => Some(*by),
            _ => None,
        }
    }

    /// Whether this trigger may complete a phase with the given links.
    ///
    /// A trigger that names an assessment or training assignment only
    /// completes the phase linked to it, so a repeated or late completion
    /// event cannot consume the next phase. Triggers without an id apply to
    /// any active phase.
    pub fn applies_to(
        &self,
        linked_assessment_id: Option<DbId>,
        linked_training_assignment_id: Option<DbId>,
    ) -> bool {
        match self {
            Self::AssessmentCompleted {
                assessment_id: Some(id),
            } => linked_assessment_id == Some(*id),
            Self::TrainingCompleted {
                training_assignment_id: Some(id),
            } => linked_training_assignment_id == Some(*id),
            _ => true,
        }
    }

    /// Build the activity metadata object for this trigger, merging any
    /// caller-supplied metadata under `"details"`.
    pub fn to_metadata(&self, details: Option<&serde_json::Value>) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        obj.insert("triggered_by".to_string(), serde_json::Value::String(self.tag()));
        obj.insert(
            "trigger".to_string(),
            serde_json::to_value(self).unwrap_or(serde_json::Value::Null),
        );
        if let Some(details) = details {
            obj.insert("details".to_string(), details.clone());
        }
        serde_json::Value::Object(obj)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
