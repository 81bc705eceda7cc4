//! # CareBook Core
//!
//! Domain types, collaborator traits and the scheduling services shared by the
//! database and API crates.
//!
//! - **models**: availability windows, appointments, callers and notifications
//! - **store**: persistence and notification seams implemented by `carebook-db`
//! - **services**: slot generation, conflict-checked booking and the CRUD
//!   operations around availability windows and appointments

pub mod errors;
pub mod models;
pub mod services;
pub mod store;
