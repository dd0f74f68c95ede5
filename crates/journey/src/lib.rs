//! The Skill Loop journey engine.
//!
//! [`JourneyEngine`] owns every state change of a journey aggregate
//! (journey row, its phases, its activity log, and the owner's journey
//! projection on `users`). Each operation runs in a single transaction that
//! begins by locking the journey row, so concurrent triggers for the same
//! journey serialize. Events are published on the
//! [`EventBus`](skill_loop_events::EventBus) only after commit.
//!
//! Operations:
//!
//! | Operation                       | Module          |
//! |---------------------------------|-----------------|
//! | `initialize_journey`            | [`initializer`] |
//! | `auto_advance_phase`            | [`transition`]  |
//! | `manually_complete_phase`       | [`transition`]  |
//! | `calculate_phase_progress`      | [`progress`]    |
//! | `check_overdue_phases`          | [`sweeper`]     |
//! | pause / resume / link / edit    | [`control`]     |

pub mod control;
pub mod engine;
pub mod error;
pub mod initializer;
pub mod progress;
mod recorder;
pub mod sweeper;
pub mod transition;

pub use engine::JourneyEngine;
pub use error::{EngineError, EngineResult};
pub use initializer::InitializeJourney;
