pub mod prelude;

pub mod community;
pub mod person;
pub mod public_schedule;
pub mod schedule;
pub mod schedule_participant;
pub mod user;
