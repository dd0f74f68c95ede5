//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query functions.

pub mod activity_repo;
pub mod journey_repo;
pub mod phase_repo;
pub mod user_repo;

pub use activity_repo::ActivityRepo;
pub use journey_repo::JourneyRepo;
pub use phase_repo::PhaseRepo;
pub use user_repo::UserRepo;
