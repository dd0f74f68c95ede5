//! Journey and phase status enums with their transition tables.
//!
//! Statuses are stored as snake_case `TEXT` columns. Every legality check
//! for a status change goes through [`PhaseStatus::can_transition_to`] or
//! [`JourneyStatus::can_transition_to`]; callers never compare strings to
//! decide whether a transition is allowed.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Generates `as_str`, `from_str_db` and `ALL` for a closed, text-backed enum.
macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// Convert to a database-compatible string.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $text ),+
                }
            }

            /// Parse a value read from the database.
            pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
                match s {
                    $( $text => Ok(Self::$variant), )+
                    _ => Err(CoreError::Validation(format!(
                        "Invalid {} '{s}'. Must be one of: {:?}",
                        $label,
                        [$( $text ),+]
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Employee category
// ---------------------------------------------------------------------------

define_text_enum! {
    /// Which kind of employee a journey is built for.
    EmployeeCategory("employee category") {
        /// One-off onboarding; the journey ends when its last phase completes.
        NewHire => "new_hire",
        /// Existing employee; completing a cycle immediately starts the next.
        Recurring => "recurring",
    }
}

impl EmployeeCategory {
    /// Whether completing a journey of this category starts a new cycle.
    pub fn renews_on_completion(self) -> bool {
        matches!(self, Self::Recurring)
    }
}

// ---------------------------------------------------------------------------
// Journey status
// ---------------------------------------------------------------------------

define_text_enum! {
    /// Lifecycle of a whole journey.
    JourneyStatus("journey status") {
        NotStarted => "not_started",
        InProgress => "in_progress",
        Paused => "paused",
        Completed => "completed",
    }
}

impl JourneyStatus {
    /// Transition rules:
    /// - `not_started` -> `in_progress`
    /// - `in_progress` -> `paused`, `completed`
    /// - `paused`      -> `in_progress`
    /// - `completed` is terminal
    pub fn can_transition_to(self, next: JourneyStatus) -> bool {
        use JourneyStatus::*;
        matches!(
            (self, next),
            (NotStarted, InProgress)
                | (InProgress, Paused)
                | (InProgress, Completed)
                | (Paused, InProgress)
        )
    }

    /// Validate a journey status change, returning a descriptive error.
    pub fn validate_transition(self, next: JourneyStatus) -> Result<(), CoreError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Cannot transition journey from '{self}' to '{next}'"
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Phase status
// ---------------------------------------------------------------------------

define_text_enum! {
    /// Lifecycle of a single phase.
    PhaseStatus("phase status") {
        NotStarted => "not_started",
        InProgress => "in_progress",
        Completed => "completed",
        /// Past its due date while still active. Still advanceable.
        Overdue => "overdue",
    }
}

impl PhaseStatus {
    /// Transition rules:
    /// - `not_started` -> `in_progress`
    /// - `in_progress` -> `completed`, `overdue`
    /// - `overdue`     -> `completed`
    /// - `completed` is terminal
    pub fn can_transition_to(self, next: PhaseStatus) -> bool {
        use PhaseStatus::*;
        matches!(
            (self, next),
            (NotStarted, InProgress)
                | (InProgress, Completed)
                | (InProgress, Overdue)
                | (Overdue, Completed)
        )
    }

    /// Validate a phase status change, returning a descriptive error.
    pub fn validate_transition(self, next: PhaseStatus) -> Result<(), CoreError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Cannot transition phase from '{self}' to '{next}'"
            )))
        }
    }

    /// A phase is active when it is the one the transition engine would
    /// complete next. Overdue phases stay active.
    pub fn is_active(self) -> bool {
        matches!(self, Self::InProgress | Self::Overdue)
    }
}

// ---------------------------------------------------------------------------
// Phase type
// ---------------------------------------------------------------------------

define_text_enum! {
    /// What kind of work a phase represents.
    PhaseType("phase type") {
        Induction => "induction",
        Orientation => "orientation",
        Training => "training",
        Assessment => "assessment",
        MentorCheckIn => "mentor_check_in",
        Project => "project",
        Review => "review",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_strings_round_trip_through_db_form() {
        for status in PhaseStatus::ALL {
            assert_eq!(PhaseStatus::from_str_db(status.as_str()).unwrap(), *status);
        }
        for status in JourneyStatus::ALL {
            assert_eq!(JourneyStatus::from_str_db(status.as_str()).unwrap(), *status);
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!(PhaseStatus::from_str_db("IN_PROGRESS").is_err());
        assert!(JourneyStatus::from_str_db("").is_err());
        assert!(EmployeeCategory::from_str_db("contractor").is_err());
    }

    #[test]
    fn test_completed_phase_never_reverts() {
        for next in PhaseStatus::ALL {
            assert!(!PhaseStatus::Completed.can_transition_to(*next));
        }
    }

    #[test]
    fn test_overdue_only_reachable_from_in_progress() {
        for from in PhaseStatus::ALL {
            let allowed = from.can_transition_to(PhaseStatus::Overdue);
            assert_eq!(allowed, *from == PhaseStatus::InProgress, "from {from}");
        }
    }

    #[test]
    fn test_overdue_phase_can_be_completed() {
        assert!(PhaseStatus::Overdue.can_transition_to(PhaseStatus::Completed));
        assert!(!PhaseStatus::Overdue.can_transition_to(PhaseStatus::InProgress));
    }

    #[test]
    fn test_active_statuses() {
        assert!(PhaseStatus::InProgress.is_active());
        assert!(PhaseStatus::Overdue.is_active());
        assert!(!PhaseStatus::NotStarted.is_active());
        assert!(!PhaseStatus::Completed.is_active());
    }

    #[test]
    fn test_journey_pause_resume_cycle() {
        assert!(JourneyStatus::InProgress.can_transition_to(JourneyStatus::Paused));
        assert!(JourneyStatus::Paused.can_transition_to(JourneyStatus::InProgress));
        assert!(!JourneyStatus::Paused.can_transition_to(JourneyStatus::Completed));
        assert!(JourneyStatus::Completed
            .validate_transition(JourneyStatus::Paused)
            .is_err());
    }

    #[test]
    fn test_only_recurring_renews() {
        assert!(EmployeeCategory::Recurring.renews_on_completion());
        assert!(!EmployeeCategory::NewHire.renews_on_completion());
    }

    #[test]
    fn test_phase_type_serializes_snake_case() {
        let json = serde_json::to_string(&PhaseType::MentorCheckIn).unwrap();
        assert_eq!(json, "\"mentor_check_in\"");
        assert_eq!(PhaseType::MentorCheckIn.as_str(), "mentor_check_in");
    }
}
