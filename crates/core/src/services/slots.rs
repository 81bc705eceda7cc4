//! # Slot Generation
//!
//! Turns a doctor's recurring weekly availability windows into the concrete
//! bookable slots of one calendar date.
//!
//! ## Algorithm
//!
//! 1. Derive the weekday of the date (0 = Sunday .. 6 = Saturday)
//! 2. Load the doctor's active windows for that weekday
//! 3. Load the start instants of the doctor's non-cancelled appointments on
//!    that date
//! 4. Walk each window from its start time in `slot_duration` steps, stopping
//!    strictly before its end time
//! 5. Drop every candidate that is already booked
//! 6. Sort chronologically and collapse duplicates produced by overlapping
//!    windows
//!
//! All instants are naive local time; no timezone conversion happens here.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{
    errors::ClinicResult,
    models::availability::{AvailabilityWindow, DayOfWeek},
    store::{AppointmentStore, AvailabilityStore},
};

/// Computes the free slots of `windows` on `date`.
///
/// Windows that are inactive or belong to another weekday contribute nothing.
/// The result is strictly increasing.
///
/// # Example
///
/// A single Monday window 09:00-12:00 with 30 minute slots and a booking at
/// 10:00 on Monday 2025-06-02 yields 09:00, 09:30, 10:30, 11:00 and 11:30.
pub fn generate_slots(
    date: NaiveDate,
    windows: &[AvailabilityWindow],
    booked: &HashSet<NaiveDateTime>,
) -> Vec<NaiveDateTime> {
    let day = DayOfWeek::of(date);

    let mut slots: Vec<NaiveDateTime> = windows
        .iter()
        .filter(|window| window.is_active && window.day_of_week == day)
        .flat_map(|window| window.slot_starts())
        .map(|start| start.on(date))
        .filter(|instant| !booked.contains(instant))
        .collect();

    slots.sort_unstable();
    slots.dedup();
    slots
}

/// Free slot start instants for `doctor_id` on `date`.
///
/// An unknown doctor or a weekday without active windows is not an error; the
/// result is simply empty.
///
/// # Errors
///
/// * `ClinicError::Database` - the store could not be read
pub async fn compute_available_slots<S>(
    store: &S,
    doctor_id: Uuid,
    date: NaiveDate,
) -> ClinicResult<Vec<NaiveDateTime>>
where
    S: AvailabilityStore + AppointmentStore + ?Sized,
{
    let day = DayOfWeek::of(date);
    let windows = store.active_windows_for_day(doctor_id, day).await?;
    if windows.is_empty() {
        debug!("No active availability for doctor {} on {:?}", doctor_id, day);
        return Ok(Vec::new());
    }

    let booked: HashSet<NaiveDateTime> = store
        .booked_start_times(doctor_id, date)
        .await?
        .into_iter()
        .map(|start| start.on(date))
        .collect();

    let slots = generate_slots(date, &windows, &booked);
    debug!(
        "Doctor {} on {}: {} windows, {} booked, {} free slots",
        doctor_id,
        date,
        windows.len(),
        booked.len(),
        slots.len()
    );

    Ok(slots)
}
