pub mod appointment;
pub mod auth;
pub mod availability;
pub mod directory;
pub mod notification;
pub mod time_of_day;
