use crate::models::DbAppointment;
use carebook_core::{
    errors::{ClinicError, ClinicResult},
    models::appointment::{AppointmentFilter, AppointmentStatus, NewAppointment},
};
use chrono::{NaiveDate, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const APPOINTMENT_COLUMNS: &str = "id, doctor_id, patient_id, appointment_date, start_time, end_time, \
     status, reason, notes, created_at, updated_at";

/// Inserts a `SCHEDULED` appointment.
///
/// `uq_appointments_active_slot` guarantees a single non-cancelled row per
/// (doctor, date, start time); losing that race surfaces here as a unique
/// violation and is reported as `ClinicError::SlotConflict`.
pub async fn create_appointment(
    pool: &Pool<Postgres>,
    appointment: &NewAppointment,
) -> ClinicResult<DbAppointment> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let result = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        INSERT INTO appointments
            (id, doctor_id, patient_id, appointment_date, start_time, end_time,
             status, reason, notes, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(appointment.doctor_id)
    .bind(appointment.patient_id)
    .bind(appointment.appointment_date)
    .bind(appointment.start_time.to_string())
    .bind(appointment.end_time.to_string())
    .bind(AppointmentStatus::Scheduled.as_str())
    .bind(appointment.reason.as_deref())
    .bind(appointment.notes.as_deref())
    .bind(now)
    .fetch_one(pool)
    .await;

    match result {
        Ok(created) => Ok(created),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            tracing::debug!(
                "Unique violation booking doctor {} at {} {}",
                appointment.doctor_id,
                appointment.appointment_date,
                appointment.start_time
            );
            Err(ClinicError::SlotConflict(format!(
                "doctor {} at {}",
                appointment.doctor_id,
                appointment.start_time.on(appointment.appointment_date)
            )))
        }
        Err(e) => Err(ClinicError::Database(e.into())),
    }
}

pub async fn get_booked_start_times(
    pool: &Pool<Postgres>,
    doctor_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<String>> {
    let start_times = sqlx::query_scalar::<_, String>(
        r#"
        SELECT start_time
        FROM appointments
        WHERE doctor_id = $1 AND appointment_date = $2 AND status <> 'CANCELLED'
        "#,
    )
    .bind(doctor_id)
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(start_times)
}

pub async fn find_active_appointment(
    pool: &Pool<Postgres>,
    doctor_id: Uuid,
    date: NaiveDate,
    start_time: &str,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE doctor_id = $1 AND appointment_date = $2 AND start_time = $3
          AND status <> 'CANCELLED'
        "#
    ))
    .bind(doctor_id)
    .bind(date)
    .bind(start_time)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

pub async fn get_appointment_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

pub async fn list_appointments(
    pool: &Pool<Postgres>,
    filter: &AppointmentFilter,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE ($1::uuid IS NULL OR doctor_id = $1)
          AND ($2::uuid IS NULL OR patient_id = $2)
          AND ($3::text IS NULL OR status = $3)
        ORDER BY appointment_date DESC, start_time DESC
        "#
    ))
    .bind(filter.doctor_id)
    .bind(filter.patient_id)
    .bind(filter.status.map(AppointmentStatus::as_str))
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

/// Updates status and/or notes.
///
/// A status change only applies to a row that is still `SCHEDULED`, checked in
/// the same statement, so a stale request cannot re-occupy a cancelled slot.
/// Such a request is reported as `ClinicError::Validation`.
pub async fn update_appointment(
    pool: &Pool<Postgres>,
    id: Uuid,
    status: Option<AppointmentStatus>,
    notes: Option<&str>,
) -> ClinicResult<DbAppointment> {
    let updated = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        UPDATE appointments
        SET status = COALESCE($2, status),
            notes = COALESCE($3, notes),
            updated_at = $4
        WHERE id = $1
          AND ($2 IS NULL OR status = 'SCHEDULED')
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(status.map(AppointmentStatus::as_str))
    .bind(notes)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await
    .map_err(|e| ClinicError::Database(e.into()))?;

    if let Some(updated) = updated {
        return Ok(updated);
    }

    match get_appointment_by_id(pool, id).await? {
        Some(current) => {
            tracing::debug!("Refused status change on appointment {} ({})", id, current.status);
            Err(ClinicError::Validation(format!(
                "Appointment is already {}",
                current.status
            )))
        }
        None => Err(ClinicError::NotFound(format!("Appointment {} not found", id))),
    }
}

pub async fn delete_appointment(pool: &Pool<Postgres>, id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM appointments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}
