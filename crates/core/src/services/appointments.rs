use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::{
    errors::{ClinicError, ClinicResult},
    models::{
        appointment::{Appointment, AppointmentFilter, AppointmentStatus, UpdateAppointmentRequest},
        auth::{Caller, Role},
        notification::{Notification, NotificationKind},
    },
    services::notifications,
    store::{AppointmentStore, Directory, Notifier},
};

/// Appointments visible to `caller`: doctors and patients see their own,
/// admins see everything.
pub async fn list_appointments<S>(
    store: &S,
    caller: &Caller,
    status: Option<AppointmentStatus>,
) -> ClinicResult<Vec<Appointment>>
where
    S: AppointmentStore + ?Sized,
{
    let mut filter = AppointmentFilter {
        status,
        ..AppointmentFilter::default()
    };

    match caller.role {
        Role::Admin => {}
        Role::Doctor => {
            filter.doctor_id = Some(
                caller
                    .doctor_id
                    .ok_or_else(|| ClinicError::NotFound("Doctor not found".to_string()))?,
            );
        }
        Role::Patient => {
            filter.patient_id = Some(
                caller
                    .patient_id
                    .ok_or_else(|| ClinicError::NotFound("Patient not found".to_string()))?,
            );
        }
        Role::Laboratory | Role::Pharmacy => {
            return Err(ClinicError::Authorization(
                "Forbidden - Insufficient permissions".to_string(),
            ));
        }
    }

    store.list_appointments(filter).await
}

fn require_participant(caller: &Caller, appointment: &Appointment) -> ClinicResult<()> {
    if caller.manages_doctor(appointment.doctor_id) || caller.is_patient(appointment.patient_id) {
        Ok(())
    } else {
        Err(ClinicError::Authorization(
            "Not a participant of this appointment".to_string(),
        ))
    }
}

pub async fn get_appointment<S>(store: &S, caller: &Caller, id: Uuid) -> ClinicResult<Appointment>
where
    S: AppointmentStore + ?Sized,
{
    let appointment = store
        .get_appointment(id)
        .await?
        .ok_or_else(|| ClinicError::NotFound("Appointment not found".to_string()))?;
    require_participant(caller, &appointment)?;
    Ok(appointment)
}

/// Changes the status and/or notes of an appointment.
///
/// Only `SCHEDULED` appointments change status. The owning doctor or an admin
/// may move it to any status; the owning patient may only cancel it.
/// Completion notifies the patient, cancellation notifies the other party.
pub async fn update_appointment<S>(
    store: &S,
    notifier: Arc<dyn Notifier>,
    caller: &Caller,
    id: Uuid,
    request: UpdateAppointmentRequest,
) -> ClinicResult<Appointment>
where
    S: AppointmentStore + Directory + ?Sized,
{
    if request.status.is_none() && request.notes.is_none() {
        return Err(ClinicError::Validation(
            "Nothing to update: provide status and/or notes".to_string(),
        ));
    }

    let current = get_appointment(store, caller, id).await?;

    if !caller.manages_doctor(current.doctor_id)
        && (request.notes.is_some()
            || request.status.is_some_and(|s| s != AppointmentStatus::Cancelled))
    {
        return Err(ClinicError::Authorization(
            "Patients may only cancel their appointments".to_string(),
        ));
    }

    let status = request.status.filter(|s| *s != current.status);
    if status.is_none() && request.notes.is_none() {
        return Ok(current);
    }
    if status.is_some() && current.status != AppointmentStatus::Scheduled {
        return Err(ClinicError::Validation(format!(
            "Appointment is already {}",
            current.status
        )));
    }

    let updated = store.update_appointment(id, status, request.notes).await?;

    if let Some(status) = status {
        info!("Appointment {} moved to {} by user {}", id, status, caller.user_id);
        notify_status_change(store, notifier, caller, &updated, status).await?;
    }

    Ok(updated)
}

async fn notify_status_change<S>(
    store: &S,
    notifier: Arc<dyn Notifier>,
    caller: &Caller,
    appointment: &Appointment,
    status: AppointmentStatus,
) -> ClinicResult<()>
where
    S: Directory + ?Sized,
{
    let doctor = store
        .find_doctor(appointment.doctor_id)
        .await?
        .ok_or_else(|| ClinicError::NotFound("Doctor not found".to_string()))?;
    let patient = store
        .find_patient(appointment.patient_id)
        .await?
        .ok_or_else(|| ClinicError::NotFound("Patient not found".to_string()))?;

    let notification = match status {
        AppointmentStatus::Completed => Notification {
            user_id: patient.user_id,
            kind: NotificationKind::Appointment,
            title: "Appointment Completed".to_string(),
            message: format!("Your appointment with Dr. {} has been completed", doctor.name),
            link: Some(format!("/patient/appointments/{}", appointment.id)),
        },
        AppointmentStatus::Cancelled if caller.role == Role::Doctor => Notification {
            user_id: patient.user_id,
            kind: NotificationKind::Appointment,
            title: "Appointment Cancelled".to_string(),
            message: format!("Dr. {} cancelled your appointment", doctor.name),
            link: Some(format!("/appointments/{}", appointment.id)),
        },
        AppointmentStatus::Cancelled => Notification {
            user_id: doctor.user_id,
            kind: NotificationKind::Appointment,
            title: "Appointment Cancelled".to_string(),
            message: format!("{} cancelled their appointment", patient.name),
            link: Some(format!("/appointments/{}", appointment.id)),
        },
        AppointmentStatus::Scheduled | AppointmentStatus::NoShow => return Ok(()),
    };

    notifications::dispatch(notifier, notification);
    Ok(())
}

/// Physically removes an appointment. Admin override only.
pub async fn delete_appointment<S>(store: &S, caller: &Caller, id: Uuid) -> ClinicResult<()>
where
    S: AppointmentStore + ?Sized,
{
    caller.require_role(&[Role::Admin])?;
    store
        .get_appointment(id)
        .await?
        .ok_or_else(|| ClinicError::NotFound("Appointment not found".to_string()))?;
    store.delete_appointment(id).await?;
    info!("Appointment {} deleted by admin {}", id, caller.user_id);
    Ok(())
}
