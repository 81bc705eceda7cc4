pub mod appointments;
pub mod availability;
pub mod booking;
pub mod notifications;
pub mod slots;
