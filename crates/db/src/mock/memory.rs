//! In-memory `ClinicStore` for tests.
//!
//! Every operation runs under one lock, so the at-most-one-active-appointment
//! rule is enforced atomically just like the unique index does in PostgreSQL.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use carebook_core::{
    errors::{ClinicError, ClinicResult},
    models::{
        appointment::{Appointment, AppointmentFilter, AppointmentStatus, NewAppointment},
        availability::{AvailabilityWindow, DayOfWeek, NewAvailabilityWindow},
        directory::{DoctorRef, PatientRef},
        time_of_day::TimeOfDay,
    },
    store::{AppointmentStore, AvailabilityStore, Directory},
};
use chrono::{NaiveDate, Utc};
use eyre::eyre;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
    doctors: HashMap<Uuid, DoctorRef>,
    patients: HashMap<Uuid, PatientRef>,
    windows: Vec<AvailabilityWindow>,
    appointments: Vec<Appointment>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    yield_after_lookup: bool,
    insert_conflicts: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose active-appointment lookup yields to the scheduler after
    /// releasing the lock, so concurrent bookings all pass the lookup before
    /// any of them inserts.
    pub fn interleaving() -> Self {
        Self {
            yield_after_lookup: true,
            ..Self::default()
        }
    }

    /// Number of inserts rejected because the slot was already taken.
    pub fn insert_conflicts(&self) -> usize {
        self.insert_conflicts.load(Ordering::SeqCst)
    }

    pub async fn add_doctor(&self, name: &str) -> DoctorRef {
        let doctor = DoctorRef {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.state.lock().await.doctors.insert(doctor.id, doctor.clone());
        doctor
    }

    pub async fn add_patient(&self, name: &str) -> PatientRef {
        let patient = PatientRef {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.state.lock().await.patients.insert(patient.id, patient.clone());
        patient
    }

    pub async fn appointments(&self) -> Vec<Appointment> {
        self.state.lock().await.appointments.clone()
    }
}

#[async_trait]
impl AvailabilityStore for InMemoryStore {
    async fn create_window(&self, window: NewAvailabilityWindow) -> ClinicResult<AvailabilityWindow> {
        let created = AvailabilityWindow {
            id: Uuid::new_v4(),
            doctor_id: window.doctor_id,
            day_of_week: window.day_of_week,
            start_time: window.start_time,
            end_time: window.end_time,
            slot_duration: window.slot_duration,
            is_active: window.is_active,
            created_at: Utc::now(),
        };
        self.state.lock().await.windows.push(created.clone());
        Ok(created)
    }

    async fn get_window(&self, id: Uuid) -> ClinicResult<Option<AvailabilityWindow>> {
        let state = self.state.lock().await;
        Ok(state.windows.iter().find(|w| w.id == id).cloned())
    }

    async fn list_windows(&self, doctor_id: Uuid) -> ClinicResult<Vec<AvailabilityWindow>> {
        let state = self.state.lock().await;
        let mut windows: Vec<_> = state
            .windows
            .iter()
            .filter(|w| w.doctor_id == doctor_id)
            .cloned()
            .collect();
        windows.sort_by_key(|w| (w.day_of_week, w.start_time));
        Ok(windows)
    }

    async fn active_windows_for_day(
        &self,
        doctor_id: Uuid,
        day: DayOfWeek,
    ) -> ClinicResult<Vec<AvailabilityWindow>> {
        let state = self.state.lock().await;
        Ok(state
            .windows
            .iter()
            .filter(|w| w.doctor_id == doctor_id && w.day_of_week == day && w.is_active)
            .cloned()
            .collect())
    }

    async fn set_window_active(&self, id: Uuid, is_active: bool) -> ClinicResult<AvailabilityWindow> {
        let mut state = self.state.lock().await;
        let window = state
            .windows
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| eyre!("Availability window {} not found", id))?;
        window.is_active = is_active;
        Ok(window.clone())
    }

    async fn delete_window(&self, id: Uuid) -> ClinicResult<()> {
        self.state.lock().await.windows.retain(|w| w.id != id);
        Ok(())
    }
}

#[async_trait]
impl AppointmentStore for InMemoryStore {
    async fn booked_start_times(&self, doctor_id: Uuid, date: NaiveDate) -> ClinicResult<Vec<TimeOfDay>> {
        let state = self.state.lock().await;
        Ok(state
            .appointments
            .iter()
            .filter(|a| a.doctor_id == doctor_id && a.appointment_date == date && a.status.occupies_slot())
            .map(|a| a.start_time)
            .collect())
    }

    async fn find_active_appointment(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        start_time: TimeOfDay,
    ) -> ClinicResult<Option<Appointment>> {
        let found = {
            let state = self.state.lock().await;
            state
                .appointments
                .iter()
                .find(|a| {
                    a.doctor_id == doctor_id
                        && a.appointment_date == date
                        && a.start_time == start_time
                        && a.status.occupies_slot()
                })
                .cloned()
        };
        if self.yield_after_lookup {
            tokio::task::yield_now().await;
        }
        Ok(found)
    }

    async fn insert_appointment(&self, new: NewAppointment) -> ClinicResult<Appointment> {
        let mut state = self.state.lock().await;

        let taken = state.appointments.iter().any(|a| {
            a.doctor_id == new.doctor_id
                && a.appointment_date == new.appointment_date
                && a.start_time == new.start_time
                && a.status.occupies_slot()
        });
        if taken {
            self.insert_conflicts.fetch_add(1, Ordering::SeqCst);
            return Err(ClinicError::SlotConflict(format!(
                "doctor {} at {}",
                new.doctor_id,
                new.start_time.on(new.appointment_date)
            )));
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            doctor_id: new.doctor_id,
            patient_id: new.patient_id,
            appointment_date: new.appointment_date,
            start_time: new.start_time,
            end_time: new.end_time,
            status: AppointmentStatus::Scheduled,
            reason: new.reason,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };
        state.appointments.push(appointment.clone());
        Ok(appointment)
    }

    async fn get_appointment(&self, id: Uuid) -> ClinicResult<Option<Appointment>> {
        let state = self.state.lock().await;
        Ok(state.appointments.iter().find(|a| a.id == id).cloned())
    }

    async fn list_appointments(&self, filter: AppointmentFilter) -> ClinicResult<Vec<Appointment>> {
        let state = self.state.lock().await;
        let mut appointments: Vec<_> = state
            .appointments
            .iter()
            .filter(|a| filter.doctor_id.is_none_or(|id| a.doctor_id == id))
            .filter(|a| filter.patient_id.is_none_or(|id| a.patient_id == id))
            .filter(|a| filter.status.is_none_or(|status| a.status == status))
            .cloned()
            .collect();
        appointments.sort_by(|a, b| b.starts_at().cmp(&a.starts_at()));
        Ok(appointments)
    }

    async fn update_appointment(
        &self,
        id: Uuid,
        status: Option<AppointmentStatus>,
        notes: Option<String>,
    ) -> ClinicResult<Appointment> {
        let mut state = self.state.lock().await;
        let appointment = state
            .appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| ClinicError::NotFound(format!("Appointment {} not found", id)))?;
        if let Some(status) = status {
            if appointment.status != AppointmentStatus::Scheduled {
                return Err(ClinicError::Validation(format!(
                    "Appointment is already {}",
                    appointment.status
                )));
            }
            appointment.status = status;
        }
        if let Some(notes) = notes {
            appointment.notes = Some(notes);
        }
        appointment.updated_at = Utc::now();
        Ok(appointment.clone())
    }

    async fn delete_appointment(&self, id: Uuid) -> ClinicResult<()> {
        self.state.lock().await.appointments.retain(|a| a.id != id);
        Ok(())
    }
}

#[async_trait]
impl Directory for InMemoryStore {
    async fn find_doctor(&self, id: Uuid) -> ClinicResult<Option<DoctorRef>> {
        Ok(self.state.lock().await.doctors.get(&id).cloned())
    }

    async fn find_patient(&self, id: Uuid) -> ClinicResult<Option<PatientRef>> {
        Ok(self.state.lock().await.patients.get(&id).cloned())
    }
}
