pub mod appointments;
pub mod auth;
pub mod availability;
pub mod blogs;
pub mod catalog;
pub mod consultants;
pub mod users;
