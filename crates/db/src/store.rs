//! PostgreSQL implementations of the core store and notifier traits.

use async_trait::async_trait;
use carebook_core::{
    errors::ClinicResult,
    models::{
        appointment::{Appointment, AppointmentFilter, AppointmentStatus, NewAppointment},
        availability::{AvailabilityWindow, DayOfWeek, NewAvailabilityWindow},
        directory::{DoctorRef, PatientRef},
        notification::Notification,
        time_of_day::TimeOfDay,
    },
    store::{AppointmentStore, AvailabilityStore, Directory, Notifier},
};
use chrono::NaiveDate;
use eyre::Result;
use uuid::Uuid;

use crate::{
    DbPool,
    models::{DbAppointment, DbAvailabilityWindow},
    repositories::{appointment, availability, directory, notification},
};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn into_windows(rows: Vec<DbAvailabilityWindow>) -> Result<Vec<AvailabilityWindow>> {
    rows.into_iter().map(AvailabilityWindow::try_from).collect()
}

fn into_appointments(rows: Vec<DbAppointment>) -> Result<Vec<Appointment>> {
    rows.into_iter().map(Appointment::try_from).collect()
}

#[async_trait]
impl AvailabilityStore for PgStore {
    async fn create_window(&self, window: NewAvailabilityWindow) -> ClinicResult<AvailabilityWindow> {
        let row = availability::create_window(&self.pool, &window).await?;
        Ok(row.try_into()?)
    }

    async fn get_window(&self, id: Uuid) -> ClinicResult<Option<AvailabilityWindow>> {
        let row = availability::get_window_by_id(&self.pool, id).await?;
        Ok(row.map(AvailabilityWindow::try_from).transpose()?)
    }

    async fn list_windows(&self, doctor_id: Uuid) -> ClinicResult<Vec<AvailabilityWindow>> {
        let rows = availability::get_windows_by_doctor_id(&self.pool, doctor_id).await?;
        Ok(into_windows(rows)?)
    }

    async fn active_windows_for_day(
        &self,
        doctor_id: Uuid,
        day: DayOfWeek,
    ) -> ClinicResult<Vec<AvailabilityWindow>> {
        let rows =
            availability::get_active_windows_for_day(&self.pool, doctor_id, i16::from(day.index()))
                .await?;
        Ok(into_windows(rows)?)
    }

    async fn set_window_active(&self, id: Uuid, is_active: bool) -> ClinicResult<AvailabilityWindow> {
        let row = availability::set_window_active(&self.pool, id, is_active).await?;
        Ok(row.try_into()?)
    }

    async fn delete_window(&self, id: Uuid) -> ClinicResult<()> {
        availability::delete_window(&self.pool, id).await?;
        Ok(())
    }
}

#[async_trait]
impl AppointmentStore for PgStore {
    async fn booked_start_times(&self, doctor_id: Uuid, date: NaiveDate) -> ClinicResult<Vec<TimeOfDay>> {
        appointment::get_booked_start_times(&self.pool, doctor_id, date)
            .await?
            .iter()
            .map(|start| start.parse())
            .collect()
    }

    async fn find_active_appointment(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        start_time: TimeOfDay,
    ) -> ClinicResult<Option<Appointment>> {
        let row =
            appointment::find_active_appointment(&self.pool, doctor_id, date, &start_time.to_string())
                .await?;
        Ok(row.map(Appointment::try_from).transpose()?)
    }

    async fn insert_appointment(&self, new: NewAppointment) -> ClinicResult<Appointment> {
        let row = appointment::create_appointment(&self.pool, &new).await?;
        Ok(row.try_into()?)
    }

    async fn get_appointment(&self, id: Uuid) -> ClinicResult<Option<Appointment>> {
        let row = appointment::get_appointment_by_id(&self.pool, id).await?;
        Ok(row.map(Appointment::try_from).transpose()?)
    }

    async fn list_appointments(&self, filter: AppointmentFilter) -> ClinicResult<Vec<Appointment>> {
        let rows = appointment::list_appointments(&self.pool, &filter).await?;
        Ok(into_appointments(rows)?)
    }

    async fn update_appointment(
        &self,
        id: Uuid,
        status: Option<AppointmentStatus>,
        notes: Option<String>,
    ) -> ClinicResult<Appointment> {
        let row = appointment::update_appointment(&self.pool, id, status, notes.as_deref()).await?;
        Ok(row.try_into()?)
    }

    async fn delete_appointment(&self, id: Uuid) -> ClinicResult<()> {
        appointment::delete_appointment(&self.pool, id).await?;
        Ok(())
    }
}

#[async_trait]
impl Directory for PgStore {
    async fn find_doctor(&self, id: Uuid) -> ClinicResult<Option<DoctorRef>> {
        let doctor = directory::get_doctor_by_id(&self.pool, id).await?;
        Ok(doctor.map(DoctorRef::from))
    }

    async fn find_patient(&self, id: Uuid) -> ClinicResult<Option<PatientRef>> {
        let patient = directory::get_patient_by_id(&self.pool, id).await?;
        Ok(patient.map(PatientRef::from))
    }
}

/// Persists notifications into the `notifications` table.
#[derive(Debug, Clone)]
pub struct PgNotifier {
    pool: DbPool,
}

impl PgNotifier {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Notifier for PgNotifier {
    async fn notify(&self, note: Notification) -> Result<()> {
        notification::create_notification(&self.pool, &note).await?;
        Ok(())
    }
}
