//! Background jobs for the journey engine.
//!
//! The worker binary runs the periodic overdue sweep and the notification
//! dispatcher next to each other, sharing one [`EventBus`](skill_loop_events::EventBus).

pub mod config;
pub mod overdue_sweeper;
