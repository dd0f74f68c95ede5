pub mod admin;
pub mod journeys;
pub mod phases;
pub mod users;
