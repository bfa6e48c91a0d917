pub mod medical;
pub mod message;
pub mod reminder;
