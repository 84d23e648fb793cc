pub mod dates;
pub mod phone;
