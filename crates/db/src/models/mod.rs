//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` or plain input structs for inserts and patches

pub mod activity;
pub mod journey;
pub mod phase;
pub mod user;
