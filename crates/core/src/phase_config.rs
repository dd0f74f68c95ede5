//! Phase templates and journey scheduling.
//!
//! A template is the ordered list of phases a journey is created from. Two
//! defaults exist, one per [`EmployeeCategory`]; callers may pass their own
//! list instead. Due dates are fixed once, at journey start, by accumulating
//! each phase's duration from the start date.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::journey::{EmployeeCategory, PhaseStatus, PhaseType};
use crate::types::{DbId, Timestamp};

/// Maximum phase title length (characters).
pub const MAX_TITLE_LENGTH: u64 = 200;

/// Maximum phase description length (characters).
pub const MAX_DESCRIPTION_LENGTH: u64 = 2_000;

/// Upper bound on a single phase's duration.
pub const MAX_DURATION_DAYS: i32 = 365;

/// Upper bound on phases per journey.
pub const MAX_PHASES: usize = 50;

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// One phase of a journey template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PhaseTemplate {
    pub phase_type: PhaseType,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 1, max = 365))]
    pub duration_days: i32,
    pub mentor_id: Option<DbId>,
}

impl PhaseTemplate {
    fn new(phase_type: PhaseType, title: &str, description: &str, duration_days: i32) -> Self {
        Self {
            phase_type,
            title: title.to_string(),
            description: Some(description.to_string()),
            duration_days,
            mentor_id: None,
        }
    }
}

/// Default phases for a new hire.
pub fn new_hire_template() -> Vec<PhaseTemplate> {
    vec![
        PhaseTemplate::new(
            PhaseType::Induction,
            "Welcome & Induction",
            "Company overview, policies and first-day setup.",
            2,
        ),
        PhaseTemplate::new(
            PhaseType::Orientation,
            "Team & Tools Orientation",
            "Meet the team and get access to the tools used day to day.",
            5,
        ),
        PhaseTemplate::new(
            PhaseType::Training,
            "Core Skill Training",
            "Assigned trainings covering the role's required skills.",
            14,
        ),
        PhaseTemplate::new(
            PhaseType::Assessment,
            "Skill Assessment",
            "Assessment of the skills covered during training.",
            3,
        ),
        PhaseTemplate::new(
            PhaseType::MentorCheckIn,
            "Mentor Check-in",
            "Review progress and open questions with a mentor.",
            7,
        ),
        PhaseTemplate::new(
            PhaseType::Review,
            "Probation Review",
            "Final onboarding review with the manager.",
            5,
        ),
    ]
}

/// Default phases for one cycle of an existing employee.
pub fn recurring_template() -> Vec<PhaseTemplate> {
    vec![
        PhaseTemplate::new(
            PhaseType::Review,
            "Skill Gap Review",
            "Compare current skill levels against role requirements.",
            7,
        ),
        PhaseTemplate::new(
            PhaseType::Training,
            "Targeted Training",
            "Trainings assigned to close the identified gaps.",
            30,
        ),
        PhaseTemplate::new(
            PhaseType::Assessment,
            "Skill Re-assessment",
            "Re-assess the skills targeted this cycle.",
            5,
        ),
        PhaseTemplate::new(
            PhaseType::Review,
            "Cycle Retrospective",
            "Wrap up the cycle and agree on focus areas for the next one.",
            3,
        ),
    ]
}

/// The default template for a category.
pub fn default_template(category: EmployeeCategory) -> Vec<PhaseTemplate> {
    match category {
        EmployeeCategory::NewHire => new_hire_template(),
        EmployeeCategory::Recurring => recurring_template(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a phase list supplied at the boundary.
pub fn validate_phase_templates(phases: &[PhaseTemplate]) -> Result<(), CoreError> {
    if phases.is_empty() {
        return Err(CoreError::Validation(
            "A journey needs at least one phase".to_string(),
        ));
    }
    if phases.len() > MAX_PHASES {
        return Err(CoreError::Validation(format!(
            "A journey may have at most {MAX_PHASES} phases, got {}",
            phases.len()
        )));
    }
    for (idx, phase) in phases.iter().enumerate() {
        phase.validate().map_err(|e| {
            CoreError::Validation(format!("Phase {}: {e}", idx + 1))
        })?;
        validate_title(&phase.title).map_err(|e| {
            CoreError::Validation(format!("Phase {}: {e}", idx + 1))
        })?;
    }
    Ok(())
}

/// Validate a new duration for an existing phase.
pub fn validate_duration_days(days: i32) -> Result<(), CoreError> {
    if !(1..=MAX_DURATION_DAYS).contains(&days) {
        return Err(CoreError::Validation(format!(
            "duration_days must be between 1 and {MAX_DURATION_DAYS}, got {days}"
        )));
    }
    Ok(())
}

/// Validate a new title for an existing phase.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    let len = title.trim().chars().count() as u64;
    if len == 0 || len > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Phase title must be 1-{MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a new description for an existing phase.
pub fn validate_description(description: &str) -> Result<(), CoreError> {
    if description.chars().count() as u64 > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Phase description exceeds {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Scheduling
// ---------------------------------------------------------------------------

/// A phase with its position, initial status and fixed due date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledPhase {
    pub phase_number: i32,
    pub template: PhaseTemplate,
    pub status: PhaseStatus,
    pub started_at: Option<Timestamp>,
    pub due_date: Timestamp,
}

/// Lay out a journey starting at `start`.
///
/// Phase numbers are `1..=N`. Each due date is the previous phase's due date
/// (or `start` for phase 1) plus the phase's duration. Phase 1 starts
/// `in_progress` at `start`; every other phase is `not_started`.
pub fn schedule_phases(start: Timestamp, phases: &[PhaseTemplate]) -> Vec<ScheduledPhase> {
    let mut cursor = start;
    phases
        .iter()
        .enumerate()
        .map(|(idx, template)| {
            cursor += Duration::days(i64::from(template.duration_days));
            let first = idx == 0;
            ScheduledPhase {
                phase_number: idx as i32 + 1,
                template: template.clone(),
                status: if first {
                    PhaseStatus::InProgress
                } else {
                    PhaseStatus::NotStarted
                },
                started_at: first.then_some(start),
                due_date: cursor,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn phase(days: i32) -> PhaseTemplate {
        PhaseTemplate {
            phase_type: PhaseType::Training,
            title: format!("{days}-day phase"),
            description: None,
            duration_days: days,
            mentor_id: None,
        }
    }

    fn jan(day: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_due_dates_accumulate_from_start() {
        let scheduled = schedule_phases(jan(1), &[phase(3), phase(5)]);
        assert_eq!(scheduled.len(), 2);
        assert_eq!(scheduled[0].due_date, jan(4));
        assert_eq!(scheduled[1].due_date, jan(9));
    }

    #[test]
    fn test_only_first_phase_starts_active() {
        let scheduled = schedule_phases(jan(1), &[phase(3), phase(5), phase(1)]);
        assert_eq!(scheduled[0].status, PhaseStatus::InProgress);
        assert_eq!(scheduled[0].started_at, Some(jan(1)));
        for later in &scheduled[1..] {
            assert_eq!(later.status, PhaseStatus::NotStarted);
            assert_eq!(later.started_at, None);
        }
    }

    #[test]
    fn test_phase_numbers_are_contiguous_from_one() {
        let scheduled = schedule_phases(jan(1), &new_hire_template());
        let numbers: Vec<i32> = scheduled.iter().map(|p| p.phase_number).collect();
        assert_eq!(numbers, (1..=scheduled.len() as i32).collect::<Vec<_>>());
    }

    #[test]
    fn test_default_templates_are_valid() {
        for category in EmployeeCategory::ALL {
            let template = default_template(*category);
            assert!(validate_phase_templates(&template).is_ok(), "{category}");
        }
    }

    #[test]
    fn test_empty_template_is_rejected() {
        assert!(validate_phase_templates(&[]).is_err());
    }

    #[test]
    fn test_non_positive_duration_is_rejected() {
        assert!(validate_phase_templates(&[phase(0)]).is_err());
        assert!(validate_phase_templates(&[phase(2), phase(-1)]).is_err());
        assert!(validate_duration_days(0).is_err());
        assert!(validate_duration_days(14).is_ok());
    }

    #[test]
    fn test_blank_title_is_rejected() {
        let mut p = phase(2);
        p.title = String::new();
        assert!(validate_phase_templates(&[p]).is_err());
        assert!(validate_title("   ").is_err());
        assert!(validate_title("Induction").is_ok());
    }

    #[test]
    fn test_whitespace_title_is_rejected_at_creation() {
        let mut p = phase(2);
        p.title = "   ".to_string();
        let err = validate_phase_templates(&[phase(1), p]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(msg) if msg.starts_with("Phase 2:")));
    }

    #[test]
    fn test_overlong_description_is_rejected() {
        let long = "x".repeat(MAX_DESCRIPTION_LENGTH as usize + 1);
        assert!(validate_description(&long).is_err());
        let mut p = phase(2);
        p.description = Some(long);
        assert!(validate_phase_templates(&[p]).is_err());
    }
}
