//! # Conflict-Checked Booking
//!
//! Booking re-checks the requested slot even when the caller has just listed
//! it as free, because the listing and the booking are separate requests.
//! That re-check alone is racy, so the final word belongs to the store: its
//! insert enforces at most one non-cancelled appointment per
//! (doctor, date, start time) and reports a lost race as
//! `ClinicError::SlotConflict`.

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    errors::{ClinicError, ClinicResult},
    models::{
        appointment::{Appointment, BookAppointmentRequest, NewAppointment},
        auth::{Caller, Role},
        notification::{Notification, NotificationKind},
    },
    services::notifications,
    store::{AppointmentStore, Directory, Notifier},
};

/// Books a `SCHEDULED` appointment for the requested slot.
///
/// Patients always book for their own profile; admins must name the patient
/// they book for. The doctor is notified in the background once the
/// appointment exists.
///
/// # Errors
///
/// * `ClinicError::Authorization` - caller is neither a patient nor an admin
/// * `ClinicError::Validation` - empty time range or missing `patient_id` for an admin
/// * `ClinicError::NotFound` - unknown doctor or patient
/// * `ClinicError::SlotConflict` - the slot is held by another appointment
/// * `ClinicError::Database` - persistence failure
pub async fn book_appointment<S>(
    store: &S,
    notifier: Arc<dyn Notifier>,
    caller: &Caller,
    request: BookAppointmentRequest,
) -> ClinicResult<Appointment>
where
    S: AppointmentStore + Directory + ?Sized,
{
    caller.require_role(&[Role::Patient, Role::Admin])?;

    let patient_id = match caller.role {
        Role::Patient => caller
            .patient_id
            .ok_or_else(|| ClinicError::NotFound("Patient not found".to_string()))?,
        _ => request.patient_id.ok_or_else(|| {
            ClinicError::Validation(
                "patient_id is required when booking on behalf of a patient".to_string(),
            )
        })?,
    };

    if request.start_time >= request.end_time {
        return Err(ClinicError::Validation(
            "Start time must be before end time".to_string(),
        ));
    }

    let doctor = store
        .find_doctor(request.doctor_id)
        .await?
        .ok_or_else(|| ClinicError::NotFound(format!("Doctor with ID {} not found", request.doctor_id)))?;
    let patient = store
        .find_patient(patient_id)
        .await?
        .ok_or_else(|| ClinicError::NotFound(format!("Patient with ID {} not found", patient_id)))?;

    let slot = request.start_time.on(request.appointment_date);
    if let Some(existing) = store
        .find_active_appointment(doctor.id, request.appointment_date, request.start_time)
        .await?
    {
        debug!("Slot {} of doctor {} held by appointment {}", slot, doctor.id, existing.id);
        return Err(ClinicError::SlotConflict(format!(
            "doctor {} at {}",
            doctor.id, slot
        )));
    }

    let appointment = store
        .insert_appointment(NewAppointment {
            doctor_id: doctor.id,
            patient_id: patient.id,
            appointment_date: request.appointment_date,
            start_time: request.start_time,
            end_time: request.end_time,
            reason: request.reason,
            notes: request.notes,
        })
        .await?;

    info!(
        "Appointment {} booked: doctor={}, patient={}, slot={}",
        appointment.id, doctor.id, patient.id, slot
    );

    notifications::dispatch(
        notifier,
        Notification {
            user_id: doctor.user_id,
            kind: NotificationKind::Appointment,
            title: "New Appointment Booked".to_string(),
            message: format!("{} booked an appointment", patient.name),
            link: Some(format!("/doctor/appointments/{}", appointment.id)),
        },
    );

    Ok(appointment)
}
