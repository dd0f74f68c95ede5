//! Domain rules for the Skill Loop employee journey engine.
//!
//! Everything in this crate is pure: status enums and their transition
//! tables, phase templates, schedule and progress math, and the advance
//! planner. Persistence lives in `skill-loop-db`, orchestration in
//! `skill-loop-journey`.

pub mod activity;
pub mod advance;
pub mod error;
pub mod journey;
pub mod phase_config;
pub mod progress;
pub mod roles;
pub mod types;
