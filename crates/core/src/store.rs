//! Seams between the scheduling services and their collaborators.
//!
//! `carebook-db` implements the store traits on PostgreSQL and provides
//! mocks plus an in-memory store for tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    errors::ClinicResult,
    models::{
        appointment::{Appointment, AppointmentFilter, AppointmentStatus, NewAppointment},
        availability::{AvailabilityWindow, DayOfWeek, NewAvailabilityWindow},
        directory::{DoctorRef, PatientRef},
        notification::Notification,
        time_of_day::TimeOfDay,
    },
};

#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    async fn create_window(&self, window: NewAvailabilityWindow) -> ClinicResult<AvailabilityWindow>;

    async fn get_window(&self, id: Uuid) -> ClinicResult<Option<AvailabilityWindow>>;

    /// All windows of a doctor ordered by day of week, then start time.
    async fn list_windows(&self, doctor_id: Uuid) -> ClinicResult<Vec<AvailabilityWindow>>;

    /// Active windows of a doctor on one weekday, in storage order.
    async fn active_windows_for_day(
        &self,
        doctor_id: Uuid,
        day: DayOfWeek,
    ) -> ClinicResult<Vec<AvailabilityWindow>>;

    async fn set_window_active(&self, id: Uuid, is_active: bool) -> ClinicResult<AvailabilityWindow>;

    async fn delete_window(&self, id: Uuid) -> ClinicResult<()>;
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Start times of every non-cancelled appointment of a doctor on `date`.
    async fn booked_start_times(&self, doctor_id: Uuid, date: NaiveDate) -> ClinicResult<Vec<TimeOfDay>>;

    async fn find_active_appointment(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        start_time: TimeOfDay,
    ) -> ClinicResult<Option<Appointment>>;

    /// Inserts a `SCHEDULED` appointment.
    ///
    /// Implementations must enforce at most one non-cancelled appointment per
    /// (doctor, date, start time) atomically and report a violation as
    /// `ClinicError::SlotConflict`.
    async fn insert_appointment(&self, appointment: NewAppointment) -> ClinicResult<Appointment>;

    async fn get_appointment(&self, id: Uuid) -> ClinicResult<Option<Appointment>>;

    /// Matching appointments, latest date first.
    async fn list_appointments(&self, filter: AppointmentFilter) -> ClinicResult<Vec<Appointment>>;

    /// Sets status and/or notes.
    ///
    /// A status change must be refused with `ClinicError::Validation` unless
    /// the appointment is still `SCHEDULED` at the time of the write.
    async fn update_appointment(
        &self,
        id: Uuid,
        status: Option<AppointmentStatus>,
        notes: Option<String>,
    ) -> ClinicResult<Appointment>;

    async fn delete_appointment(&self, id: Uuid) -> ClinicResult<()>;
}

/// Read access to the profile records owned by the user-management system.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn find_doctor(&self, id: Uuid) -> ClinicResult<Option<DoctorRef>>;

    async fn find_patient(&self, id: Uuid) -> ClinicResult<Option<PatientRef>>;
}

/// Everything the API needs from persistence.
pub trait ClinicStore: AvailabilityStore + AppointmentStore + Directory {}

impl<T> ClinicStore for T where T: AvailabilityStore + AppointmentStore + Directory {}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> eyre::Result<()>;
}
