use tracing::info;
use uuid::Uuid;

use crate::{
    errors::{ClinicError, ClinicResult},
    models::{
        auth::Caller,
        availability::{AvailabilityWindow, CreateAvailabilityRequest},
    },
    store::{AvailabilityStore, Directory},
};

/// Adds a recurring window to a doctor's week.
///
/// Invariants are checked here, at write time, so slot generation can trust
/// every stored window.
pub async fn create_window<S>(
    store: &S,
    caller: &Caller,
    doctor_id: Uuid,
    request: CreateAvailabilityRequest,
) -> ClinicResult<AvailabilityWindow>
where
    S: AvailabilityStore + Directory + ?Sized,
{
    caller.require_doctor_owner(doctor_id)?;

    let window = request.into_new_window(doctor_id);
    window.validate()?;

    store
        .find_doctor(doctor_id)
        .await?
        .ok_or_else(|| ClinicError::NotFound(format!("Doctor with ID {} not found", doctor_id)))?;

    let created = store.create_window(window).await?;
    info!(
        "Availability window {} created for doctor {} ({:?} {}-{})",
        created.id, doctor_id, created.day_of_week, created.start_time, created.end_time
    );
    Ok(created)
}

pub async fn list_windows<S>(store: &S, doctor_id: Uuid) -> ClinicResult<Vec<AvailabilityWindow>>
where
    S: AvailabilityStore + ?Sized,
{
    store.list_windows(doctor_id).await
}

async fn owned_window<S>(store: &S, caller: &Caller, id: Uuid) -> ClinicResult<AvailabilityWindow>
where
    S: AvailabilityStore + ?Sized,
{
    let window = store
        .get_window(id)
        .await?
        .ok_or_else(|| ClinicError::NotFound("Availability not found".to_string()))?;
    caller.require_doctor_owner(window.doctor_id)?;
    Ok(window)
}

/// Turns a window on or off without touching booked appointments.
pub async fn set_window_active<S>(
    store: &S,
    caller: &Caller,
    id: Uuid,
    is_active: bool,
) -> ClinicResult<AvailabilityWindow>
where
    S: AvailabilityStore + ?Sized,
{
    owned_window(store, caller, id).await?;
    store.set_window_active(id, is_active).await
}

pub async fn delete_window<S>(store: &S, caller: &Caller, id: Uuid) -> ClinicResult<()>
where
    S: AvailabilityStore + ?Sized,
{
    let window = owned_window(store, caller, id).await?;
    store.delete_window(id).await?;
    info!("Availability window {} of doctor {} deleted", id, window.doctor_id);
    Ok(())
}
