pub use super::community::Entity as Community;
pub use super::person::Entity as Person;
pub use super::public_schedule::Entity as PublicSchedule;
pub use super::schedule::Entity as Schedule;
pub use super::schedule_participant::Entity as ScheduleParticipant;
pub use super::user::Entity as User;
