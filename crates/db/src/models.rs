use carebook_core::models::{
    appointment::Appointment,
    availability::{AvailabilityWindow, DayOfWeek},
    directory::{DoctorRef, PatientRef},
};
use chrono::{DateTime, NaiveDate, Utc};
use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbDoctor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPatient {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAvailabilityWindow {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub day_of_week: i16,
    pub start_time: String,
    pub end_time: String,
    pub slot_duration: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub status: String,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbNotification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<DbDoctor> for DoctorRef {
    fn from(doctor: DbDoctor) -> Self {
        DoctorRef {
            id: doctor.id,
            user_id: doctor.user_id,
            name: doctor.name,
        }
    }
}

impl From<DbPatient> for PatientRef {
    fn from(patient: DbPatient) -> Self {
        PatientRef {
            id: patient.id,
            user_id: patient.user_id,
            name: patient.name,
        }
    }
}

impl TryFrom<DbAvailabilityWindow> for AvailabilityWindow {
    type Error = eyre::Report;

    fn try_from(row: DbAvailabilityWindow) -> Result<Self> {
        let day_of_week = DayOfWeek::from_index(i64::from(row.day_of_week))
            .ok_or_else(|| eyre!("Invalid day_of_week {} on window {}", row.day_of_week, row.id))?;
        let slot_duration = u32::try_from(row.slot_duration)
            .map_err(|_| eyre!("Invalid slot_duration {} on window {}", row.slot_duration, row.id))?;

        Ok(AvailabilityWindow {
            id: row.id,
            doctor_id: row.doctor_id,
            day_of_week,
            start_time: row.start_time.parse()?,
            end_time: row.end_time.parse()?,
            slot_duration,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<DbAppointment> for Appointment {
    type Error = eyre::Report;

    fn try_from(row: DbAppointment) -> Result<Self> {
        Ok(Appointment {
            id: row.id,
            doctor_id: row.doctor_id,
            patient_id: row.patient_id,
            appointment_date: row.appointment_date,
            start_time: row.start_time.parse()?,
            end_time: row.end_time.parse()?,
            status: row.status.parse()?,
            reason: row.reason,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
