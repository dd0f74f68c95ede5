//! Journey progress math.
//!
//! Read-only view over a journey's phases. Day counts are only reported for
//! new-hire journeys, whose schedule has a fixed end; recurring cycles omit
//! them.

use serde::Serialize;

use crate::journey::{EmployeeCategory, PhaseStatus};
use crate::types::Timestamp;

const SECONDS_PER_DAY: i64 = 86_400;

/// The parts of a phase row the progress calculation needs.
#[derive(Debug, Clone, Copy)]
pub struct ProgressPhase {
    pub phase_number: i32,
    pub status: PhaseStatus,
    pub due_date: Option<Timestamp>,
}

/// Derived progress of a journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseProgress {
    pub total_phases: i32,
    pub completed_phases: i32,
    /// Number of the active phase, or `0` when none is active.
    pub current_phase_number: i32,
    pub progress_percentage: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_elapsed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_completion_date: Option<Timestamp>,
}

/// `round(100 * completed / total)`, half rounding up. `0` for no phases.
pub fn percentage(completed: i32, total: i32) -> i32 {
    if total <= 0 {
        return 0;
    }
    let completed = i64::from(completed);
    let total = i64::from(total);
    ((200 * completed + total) / (2 * total)) as i32
}

/// Whole days from `from` to `to`, rounded towards negative infinity.
pub fn whole_days_between(from: Timestamp, to: Timestamp) -> i64 {
    (to - from).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Compute progress for a journey as of `now`.
pub fn calculate_progress(
    category: EmployeeCategory,
    started_at: Timestamp,
    phases: &[ProgressPhase],
    now: Timestamp,
) -> PhaseProgress {
    let total_phases = phases.len() as i32;
    let completed_phases = phases
        .iter()
        .filter(|p| p.status == PhaseStatus::Completed)
        .count() as i32;
    let current_phase_number = phases
        .iter()
        .filter(|p| p.status.is_active())
        .map(|p| p.phase_number)
        .min()
        .unwrap_or(0);

    let mut progress = PhaseProgress {
        total_phases,
        completed_phases,
        current_phase_number,
        progress_percentage: percentage(completed_phases, total_phases),
        days_elapsed: None,
        days_remaining: None,
        expected_completion_date: None,
    };

    if category == EmployeeCategory::NewHire {
        let expected = phases
            .iter()
            .max_by_key(|p| p.phase_number)
            .and_then(|p| p.due_date);
        if let Some(expected) = expected {
            let elapsed = whole_days_between(started_at, now);
            let planned = whole_days_between(started_at, expected);
            progress.days_elapsed = Some(elapsed);
            progress.days_remaining = Some((planned - elapsed).max(0));
            progress.expected_completion_date = Some(expected);
        }
    }

    progress
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn start() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn phases(statuses: &[PhaseStatus], days_each: i64) -> Vec<ProgressPhase> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, s)| ProgressPhase {
                phase_number: i as i32 + 1,
                status: *s,
                due_date: Some(start() + Duration::days(days_each * (i as i64 + 1))),
            })
            .collect()
    }

    #[test]
    fn test_two_of_five_is_forty_percent() {
        use PhaseStatus::*;
        let p = phases(&[Completed, Completed, InProgress, NotStarted, NotStarted], 2);
        let progress = calculate_progress(EmployeeCategory::Recurring, start(), &p, start());
        assert_eq!(progress.total_phases, 5);
        assert_eq!(progress.completed_phases, 2);
        assert_eq!(progress.progress_percentage, 40);
        assert_eq!(progress.current_phase_number, 3);
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(0, 4), 0);
        assert_eq!(percentage(4, 4), 100);
    }

    #[test]
    fn test_no_active_phase_reports_zero() {
        use PhaseStatus::*;
        let p = phases(&[Completed, Completed], 2);
        let progress = calculate_progress(EmployeeCategory::NewHire, start(), &p, start());
        assert_eq!(progress.current_phase_number, 0);
        assert_eq!(progress.progress_percentage, 100);
    }

    #[test]
    fn test_overdue_phase_counts_as_current() {
        use PhaseStatus::*;
        let p = phases(&[Completed, Overdue, NotStarted], 2);
        let progress = calculate_progress(EmployeeCategory::NewHire, start(), &p, start());
        assert_eq!(progress.current_phase_number, 2);
    }

    #[test]
    fn test_new_hire_reports_day_counts() {
        use PhaseStatus::*;
        // Three phases of 4 days: expected completion on day 12.
        let p = phases(&[Completed, InProgress, NotStarted], 4);
        let now = start() + Duration::days(5) + Duration::hours(20);
        let progress = calculate_progress(EmployeeCategory::NewHire, start(), &p, now);
        assert_eq!(progress.days_elapsed, Some(5));
        assert_eq!(progress.days_remaining, Some(7));
        assert_eq!(
            progress.expected_completion_date,
            Some(start() + Duration::days(12))
        );
    }

    #[test]
    fn test_days_remaining_never_negative() {
        use PhaseStatus::*;
        let p = phases(&[InProgress], 3);
        let now = start() + Duration::days(30);
        let progress = calculate_progress(EmployeeCategory::NewHire, start(), &p, now);
        assert_eq!(progress.days_remaining, Some(0));
    }

    #[test]
    fn test_recurring_omits_day_counts() {
        use PhaseStatus::*;
        let p = phases(&[InProgress, NotStarted], 3);
        let progress = calculate_progress(EmployeeCategory::Recurring, start(), &p, start());
        assert_eq!(progress.days_elapsed, None);
        assert_eq!(progress.days_remaining, None);
        assert_eq!(progress.expected_completion_date, None);

        let json = serde_json::to_value(&progress).unwrap();
        assert!(json.get("days_elapsed").is_none());
    }

    #[test]
    fn test_whole_days_floor_before_start() {
        let earlier = start() - Duration::hours(1);
        assert_eq!(whole_days_between(start(), earlier), -1);
    }
}
