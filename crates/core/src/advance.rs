//! Phase advancement planning.
//!
//! [`plan_advance`] decides what a single advance does to a journey, given
//! the current state of its phases. It performs no I/O: the journey engine
//! loads the phases under a row lock, asks for a plan, and applies it in the
//! same transaction.

use crate::error::CoreError;
use crate::journey::PhaseStatus;
use crate::types::DbId;

/// The parts of a phase row the planner needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSnapshot {
    pub id: DbId,
    pub phase_number: i32,
    pub status: PhaseStatus,
}

/// Reference to a phase inside a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseRef {
    pub id: DbId,
    pub phase_number: i32,
}

impl From<&PhaseSnapshot> for PhaseRef {
    fn from(p: &PhaseSnapshot) -> Self {
        Self {
            id: p.id,
            phase_number: p.phase_number,
        }
    }
}

/// What one advance does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvancePlan {
    /// Complete the active phase and start the one after it.
    ActivateNext { completed: PhaseRef, next: PhaseRef },
    /// Complete the active phase; it was the last one, so the journey ends.
    CompleteJourney { completed: PhaseRef },
}

impl AdvancePlan {
    /// The phase this plan completes.
    pub fn completed(&self) -> PhaseRef {
        match self {
            Self::ActivateNext { completed, .. } | Self::CompleteJourney { completed } => {
                *completed
            }
        }
    }
}

/// Check that phase numbers are exactly `1..=N` when sorted.
pub fn validate_phase_numbers(phases: &[PhaseSnapshot]) -> Result<(), CoreError> {
    let mut numbers: Vec<i32> = phases.iter().map(|p| p.phase_number).collect();
    numbers.sort_unstable();
    for (idx, number) in numbers.iter().enumerate() {
        let expected = idx as i32 + 1;
        if *number != expected {
            return Err(CoreError::InvariantViolation(format!(
                "Phase numbers must be contiguous from 1; expected {expected}, found {number}"
            )));
        }
    }
    Ok(())
}

/// Find the single active (`in_progress` or `overdue`) phase.
///
/// Returns `Ok(None)` when no phase is active and an invariant violation
/// when more than one is.
pub fn find_active_phase(phases: &[PhaseSnapshot]) -> Result<Option<PhaseSnapshot>, CoreError> {
    let mut active = phases.iter().filter(|p| p.status.is_active());
    let first = active.next().copied();
    if let Some(second) = active.next() {
        return Err(CoreError::InvariantViolation(format!(
            "Phases {} and {} are both active",
            first.map(|p| p.phase_number).unwrap_or_default(),
            second.phase_number
        )));
    }
    Ok(first)
}

/// Plan one advance over a journey's phases.
///
/// Returns `Ok(None)` when there is no active phase: the journey is already
/// settled and the advance is a no-op.
pub fn plan_advance(phases: &[PhaseSnapshot]) -> Result<Option<AdvancePlan>, CoreError> {
    validate_phase_numbers(phases)?;

    let Some(active) = find_active_phase(phases)? else {
        return Ok(None);
    };
    active.status.validate_transition(PhaseStatus::Completed)?;

    let next_number = active.phase_number + 1;
    let plan = match phases.iter().find(|p| p.phase_number == next_number) {
        Some(next) => {
            if !next.status.can_transition_to(PhaseStatus::InProgress) {
                return Err(CoreError::InvariantViolation(format!(
                    "Phase {} follows the active phase {} but is '{}'",
                    next.phase_number, active.phase_number, next.status
                )));
            }
            AdvancePlan::ActivateNext {
                completed: PhaseRef::from(&active),
                next: PhaseRef::from(next),
            }
        }
        None => AdvancePlan::CompleteJourney {
            completed: PhaseRef::from(&active),
        },
    };
    Ok(Some(plan))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
